//! Command line and environment surface shared by the binaries.
//!
//! Every option can also come from the environment variable named in its
//! `env` attribute. Nothing below the CLI layer reads the environment.

use crate::noise::{NoiseConfig, NoiseMode};
use clap::Args;
use seekbeacon_core::{Error, ListenerId, SeekingConfig, StreamId};
use seekbeacon_health::HealthContext;
use seekbeacon_listener::ListenerConfig;
use std::path::PathBuf;
use std::time::Duration;

fn secs(name: &str, value: f64) -> Result<Duration, Error> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| Error::config(format!("{name} must be a finite, non-negative number of seconds (got {value})")))
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Emit logs as JSON lines on stderr
    #[arg(long, default_value_t = false)]
    pub log_json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StateFileArgs {
    /// Append-only beacon log
    #[arg(long, env = "NOISE_SEEK_BEACON_PATH", default_value = "runtime/beacons.jsonl")]
    pub beacon_path: PathBuf,

    /// Subscription registry file
    #[arg(long, env = "NOISE_SEEK_SUBSCRIPTIONS_PATH", default_value = "runtime/subscriptions.json")]
    pub subscriptions_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SeekingArgs {
    /// Stream identifier announced in beacons
    #[arg(long, env = "NOISE_STREAM_ID", default_value = "noise_metadata")]
    pub stream_id: String,

    /// Filler mode: words, bytes or markov
    #[arg(long, env = "NOISE_MODE", default_value = "markov")]
    pub mode: NoiseMode,

    /// Shortest sleep between events, seconds
    #[arg(long, env = "NOISE_MIN_INTERVAL_S", default_value_t = 1.0)]
    pub min_interval_s: f64,

    /// Longest sleep between events, seconds
    #[arg(long, env = "NOISE_MAX_INTERVAL_S", default_value_t = 4.0)]
    pub max_interval_s: f64,

    /// Unattached seconds before seeking starts
    #[arg(long, env = "NOISE_SEEK_LONELY_AFTER_S", default_value_t = 12.0)]
    pub lonely_after_s: f64,

    /// Unattached seconds before seeking escalates
    #[arg(long, env = "NOISE_SEEK_ESCALATE_AFTER_S", default_value_t = 30.0)]
    pub escalate_after_s: f64,

    /// Declared shutdown threshold, seconds
    #[arg(long, env = "NOISE_SEEK_SHUTDOWN_AFTER_S", default_value_t = 120.0)]
    pub shutdown_after_s: f64,

    /// Beacon interval while seeking_low, seconds
    #[arg(long, env = "NOISE_SEEK_BEACON_INTERVAL_LOW_S", default_value_t = 10.0)]
    pub interval_low_s: f64,

    /// Beacon interval while seeking_escalate, seconds
    #[arg(long, env = "NOISE_SEEK_BEACON_INTERVAL_ESC_S", default_value_t = 5.0)]
    pub interval_escalate_s: f64,
}

impl SeekingArgs {
    /// Resolve and validate.
    pub fn to_config(&self) -> Result<SeekingConfig, Error> {
        let config = SeekingConfig::new(self.stream_id.as_str())
            .with_thresholds(
                secs("lonely_after", self.lonely_after_s)?,
                secs("escalate_after", self.escalate_after_s)?,
                secs("shutdown_after", self.shutdown_after_s)?,
            )
            .with_intervals(
                secs("interval_low", self.interval_low_s)?,
                secs("interval_escalate", self.interval_escalate_s)?,
            )
            .with_mode(self.mode.as_str())
            .with_tempo_range(self.min_interval_s, self.max_interval_s);
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug, Clone)]
pub struct NoiseArgs {
    /// Comma separated word list for words mode
    #[arg(long, env = "NOISE_WORDSET")]
    pub wordset: Option<String>,

    /// Skip token entropy metrics
    #[arg(long, env = "NOISE_DISABLE_TOKEN_ENT", default_value_t = false)]
    pub disable_token_ent: bool,
}

impl NoiseArgs {
    pub fn to_config(&self, mode: NoiseMode) -> NoiseConfig {
        let config = NoiseConfig::new(mode).with_token_entropy(!self.disable_token_ent);
        match &self.wordset {
            Some(raw) => config.with_wordset(raw),
            None => config,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ListenerArgs {
    /// Listener identity (default: listener-<8 hex>)
    #[arg(long = "listener-id", env = "LISTENER_ID")]
    pub id: Option<String>,

    /// Sleep between poll cycles, seconds
    #[arg(long, env = "LISTENER_POLL_INTERVAL_S", default_value_t = 2.5)]
    pub poll_interval_s: f64,

    /// Number of recent beacons considered per cycle
    #[arg(long, env = "LISTENER_TAIL_N", default_value_t = 250)]
    pub tail_n: usize,

    /// Only claim this stream
    #[arg(long, env = "TARGET_STREAM_ID")]
    pub target_stream: Option<String>,
}

impl ListenerArgs {
    pub fn to_config(&self) -> Result<ListenerConfig, Error> {
        let id = match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => ListenerId::new(id),
            _ => ListenerId::generate(),
        };
        if self.tail_n == 0 {
            return Err(Error::config("tail_n must be at least 1"));
        }
        Ok(ListenerConfig {
            id,
            poll_interval: secs("poll_interval", self.poll_interval_s)?,
            tail_n: self.tail_n,
            target_stream: non_empty_stream(self.target_stream.as_deref()),
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct HealthArgs {
    /// Directory that must accept writes
    #[arg(long, env = "RUNTIME_DIR", default_value = "runtime")]
    pub runtime_dir: PathBuf,

    /// Stream expected to be seeking
    #[arg(long, env = "TARGET_STREAM_ID")]
    pub target_stream: Option<String>,
}

impl HealthArgs {
    pub fn to_context<F>(&self, files: &StateFileArgs, env_lookup: F) -> HealthContext
    where
        F: Fn(&str) -> Option<String>,
    {
        HealthContext::new(
            files.beacon_path.clone(),
            files.subscriptions_path.clone(),
            self.runtime_dir.clone(),
        )
        .with_target(non_empty_stream(self.target_stream.as_deref()))
        .with_env(seekbeacon_health::WATCHED_ENV, env_lookup)
    }
}

fn non_empty_stream(raw: Option<&str>) -> Option<StreamId> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(StreamId::new)
}
