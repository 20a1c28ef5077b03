//! Inputs shared by all checks, resolved once by the caller.

use seekbeacon_core::StreamId;
use std::path::PathBuf;

/// Environment variables whose presence the env check reports.
pub const WATCHED_ENV: &[&str] = &[
    "NOISE_SEEK_BEACON_PATH",
    "NOISE_SEEK_SUBSCRIPTIONS_PATH",
    "TARGET_STREAM_ID",
    "LISTENER_ID",
    "RUNTIME_DIR",
];

#[derive(Debug, Clone)]
pub struct HealthContext {
    pub beacon_path: PathBuf,
    pub subscriptions_path: PathBuf,
    pub runtime_dir: PathBuf,
    pub target_stream: Option<StreamId>,
    /// (variable, set and non-empty)
    pub env: Vec<(String, bool)>,
}

impl HealthContext {
    pub fn new(
        beacon_path: impl Into<PathBuf>,
        subscriptions_path: impl Into<PathBuf>,
        runtime_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            beacon_path: beacon_path.into(),
            subscriptions_path: subscriptions_path.into(),
            runtime_dir: runtime_dir.into(),
            target_stream: None,
            env: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: Option<StreamId>) -> Self {
        self.target_stream = target;
        self
    }

    /// Record presence of each of `keys` using `lookup`.
    pub fn with_env<F>(mut self, keys: &[&str], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.env = keys
            .iter()
            .map(|k| (k.to_string(), lookup(k).is_some_and(|v| !v.is_empty())))
            .collect();
        self
    }
}
