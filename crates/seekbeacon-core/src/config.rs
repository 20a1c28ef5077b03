//! Seeking configuration
//!
//! One value per stream, resolved once at process start and handed to the
//! controller. Thresholds and intervals are durations; `mode` and
//! `tempo_range` are display hints copied into every beacon.

use crate::error::{Error, Result};
use crate::types::StreamId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeekingConfig {
    pub stream_id: StreamId,
    /// Unattached time before the stream starts seeking.
    pub lonely_after: Duration,
    /// Unattached time before seeking escalates.
    pub escalate_after: Duration,
    /// Declared cut-off. Nothing transitions on it yet.
    pub shutdown_after: Duration,
    /// Minimum gap between beacons while `seeking_low`.
    pub interval_low: Duration,
    /// Minimum gap between beacons while `seeking_escalate`.
    pub interval_escalate: Duration,
    pub mode: String,
    /// Producer tempo bounds in seconds.
    pub tempo_range: [f64; 2],
}

impl Default for SeekingConfig {
    fn default() -> Self {
        Self {
            stream_id: StreamId::new("noise_metadata"),
            lonely_after: Duration::from_secs(12),
            escalate_after: Duration::from_secs(30),
            shutdown_after: Duration::from_secs(120),
            interval_low: Duration::from_secs(10),
            interval_escalate: Duration::from_secs(5),
            mode: "markov".into(),
            tempo_range: [1.0, 4.0],
        }
    }
}

impl SeekingConfig {
    pub fn new(stream_id: impl Into<StreamId>) -> Self {
        Self {
            stream_id: stream_id.into(),
            ..Self::default()
        }
    }

    pub fn with_thresholds(mut self, lonely: Duration, escalate: Duration, shutdown: Duration) -> Self {
        self.lonely_after = lonely;
        self.escalate_after = escalate;
        self.shutdown_after = shutdown;
        self
    }

    pub fn with_intervals(mut self, low: Duration, escalate: Duration) -> Self {
        self.interval_low = low;
        self.interval_escalate = escalate;
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_tempo_range(mut self, min_s: f64, max_s: f64) -> Self {
        self.tempo_range = [min_s, max_s];
        self
    }

    /// Check the ordering constraints between thresholds and intervals.
    pub fn validate(&self) -> Result<()> {
        if self.stream_id.as_str().is_empty() {
            return Err(Error::config("stream_id must not be empty"));
        }
        if !(self.lonely_after < self.escalate_after && self.escalate_after < self.shutdown_after) {
            return Err(Error::config(format!(
                "thresholds must satisfy lonely_after < escalate_after < shutdown_after (got {:?}, {:?}, {:?})",
                self.lonely_after, self.escalate_after, self.shutdown_after
            )));
        }
        if self.interval_escalate > self.interval_low {
            return Err(Error::config(format!(
                "interval_escalate ({:?}) must not exceed interval_low ({:?})",
                self.interval_escalate, self.interval_low
            )));
        }
        if !(self.tempo_range[0] >= 0.0 && self.tempo_range[0] <= self.tempo_range[1]) {
            return Err(Error::config(format!(
                "tempo range must satisfy 0 <= min <= max (got {:?})",
                self.tempo_range
            )));
        }
        Ok(())
    }
}
