//! Seeking controller
//!
//! States: idle -> seeking_low -> seeking_escalate, driven by how long the
//! stream has gone without a listener. Observing a listener moves the stream
//! to attached and it stays there for the life of the controller, even if
//! the listener later disappears from the registry. `shutdown` and
//! `commons` exist on the wire but nothing transitions into them; past
//! `shutdown_after` the stream keeps escalating.
//!
//! All timing is `now - <recorded timestamp>` on caller-supplied Unix
//! seconds. The controller never sleeps and never fails out of `tick`.

use crate::source::RegistrySource;
use seekbeacon_core::{iso_timestamp, unix_now, Beacon, SeekingConfig, SeekingState};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Mutable per-stream bookkeeping. Owned by exactly one controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeekingStateData {
    pub state: SeekingState,
    pub produced_ticks: u64,
    pub delivered_ticks: u64,
    /// Start of the current unattached episode. Unset while attached.
    pub first_lonely_ts: Option<f64>,
    pub last_beacon_ts: Option<f64>,
    pub beacon_count: u64,
    pub attached: bool,
    /// Recomputed every tick.
    pub loneliness_ratio: f64,
}

/// Optional payload hints stamped into an emitted beacon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeaconHints {
    pub entropy_profile: Option<String>,
    pub tokens_hint: Option<Vec<String>>,
    pub spore: Option<String>,
}

impl BeaconHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entropy_profile(mut self, profile: impl Into<String>) -> Self {
        self.entropy_profile = Some(profile.into());
        self
    }

    pub fn tokens_hint(mut self, tokens: Vec<String>) -> Self {
        self.tokens_hint = Some(tokens);
        self
    }

    pub fn spore(mut self, spore: impl Into<String>) -> Self {
        self.spore = Some(spore.into());
        self
    }
}

/// Fraction of produced units without a matching delivery, in [0, 1].
pub fn loneliness_ratio(produced: u64, delivered: u64) -> f64 {
    if produced == 0 || delivered >= produced {
        return 0.0;
    }
    (produced - delivered) as f64 / produced as f64
}

fn round5(x: f64) -> f64 {
    (x * 100_000.0).round() / 100_000.0
}

pub struct SeekingController<S: RegistrySource> {
    config: SeekingConfig,
    registry: S,
    data: SeekingStateData,
}

impl<S: RegistrySource> SeekingController<S> {
    pub fn new(config: SeekingConfig, registry: S) -> Self {
        Self {
            config,
            registry,
            data: SeekingStateData::default(),
        }
    }

    pub fn config(&self) -> &SeekingConfig {
        &self.config
    }

    pub fn data(&self) -> &SeekingStateData {
        &self.data
    }

    pub fn state(&self) -> SeekingState {
        self.data.state
    }

    pub fn is_attached(&self) -> bool {
        self.data.state == SeekingState::Attached
    }

    pub fn record_production(&mut self) {
        self.data.produced_ticks = self.data.produced_ticks.saturating_add(1);
    }

    /// The caller decides what counts as a delivery; nothing is verified here.
    /// Counters saturate at `u64::MAX`.
    pub fn record_delivery(&mut self, n: u64) {
        self.data.delivered_ticks = self.data.delivered_ticks.saturating_add(n);
    }

    /// `tick` against the wall clock.
    pub fn tick_now(&mut self, hints: BeaconHints) -> Option<Beacon> {
        self.tick(unix_now(), hints)
    }

    /// Advance the state machine to `now` and return a beacon if one is due.
    pub fn tick(&mut self, now: f64, hints: BeaconHints) -> Option<Beacon> {
        let before = self.data.state;

        self.refresh_attachment();
        self.data.loneliness_ratio = loneliness_ratio(self.data.produced_ticks, self.data.delivered_ticks);
        self.update_lonely_timer(now);
        self.transition(now);

        if self.data.state != before {
            info!(
                stream = %self.config.stream_id,
                from = %before,
                to = %self.data.state,
                "seeking state changed"
            );
        }

        if self.data.state.is_seeking() && self.beacon_due(now) {
            return Some(self.build_beacon(now, hints));
        }
        None
    }

    fn refresh_attachment(&mut self) {
        let registry = match self.registry.load_registry() {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    stream = %self.config.stream_id,
                    source = %self.registry.describe(),
                    error = %e,
                    "subscription refresh failed, treating stream as unattached"
                );
                return;
            }
        };

        if registry.is_attached(&self.config.stream_id) && !self.data.attached {
            self.data.attached = true;
            self.data.state = SeekingState::Attached;
            self.data.first_lonely_ts = None;
            info!(
                stream = %self.config.stream_id,
                listeners = registry.listeners(&self.config.stream_id).len(),
                "listener observed, stream attached"
            );
        }
    }

    fn update_lonely_timer(&mut self, now: f64) {
        if self.data.attached {
            self.data.first_lonely_ts = None;
        } else if self.data.first_lonely_ts.is_none() {
            self.data.first_lonely_ts = Some(now);
        }
    }

    fn transition(&mut self, now: f64) {
        if self.data.attached {
            return;
        }
        let Some(since) = self.data.first_lonely_ts else {
            self.data.state = SeekingState::Idle;
            return;
        };

        let lonely_for = now - since;
        // Beyond shutdown_after the stream stays in escalate.
        self.data.state = if lonely_for >= self.config.escalate_after.as_secs_f64() {
            SeekingState::SeekingEscalate
        } else if lonely_for >= self.config.lonely_after.as_secs_f64() {
            SeekingState::SeekingLow
        } else {
            SeekingState::Idle
        };
    }

    fn beacon_due(&self, now: f64) -> bool {
        let interval = match self.data.state {
            SeekingState::SeekingLow => self.config.interval_low,
            _ => self.config.interval_escalate,
        };
        let last = self.data.last_beacon_ts.unwrap_or(0.0);
        now - last >= interval.as_secs_f64()
    }

    fn build_beacon(&mut self, now: f64, hints: BeaconHints) -> Beacon {
        self.data.last_beacon_ts = Some(now);
        self.data.beacon_count += 1;

        let beacon = Beacon {
            ts: iso_timestamp(now),
            stream_id: self.config.stream_id.clone(),
            state: self.data.state,
            seq: self.data.produced_ticks,
            produced_ticks: self.data.produced_ticks,
            delivered_ticks: self.data.delivered_ticks,
            loneliness_ratio: round5(self.data.loneliness_ratio),
            mode: self.config.mode.clone(),
            entropy_profile: hints.entropy_profile.unwrap_or_else(|| "unknown".into()),
            tempo_range: self.config.tempo_range,
            tokens_hint: hints.tokens_hint.unwrap_or_default(),
            spore: hints.spore.unwrap_or_default(),
            beacon_n: self.data.beacon_count,
        };
        debug!(stream = %beacon.stream_id, state = %beacon.state, n = beacon.beacon_n, "beacon built");
        beacon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seekbeacon_core::SubscriptionRegistry;
    use std::time::Duration;

    fn config() -> SeekingConfig {
        SeekingConfig::new("s1")
            .with_thresholds(Duration::from_secs(10), Duration::from_secs(20), Duration::from_secs(60))
            .with_intervals(Duration::from_secs(5), Duration::from_secs(2))
    }

    #[test]
    fn ratio_zero_without_production() {
        assert_eq!(loneliness_ratio(0, 0), 0.0);
        assert_eq!(loneliness_ratio(0, 3), 0.0);
    }

    #[test]
    fn ratio_zero_when_delivery_catches_up() {
        assert_eq!(loneliness_ratio(4, 4), 0.0);
        assert_eq!(loneliness_ratio(4, 9), 0.0);
    }

    #[test]
    fn ratio_fraction_of_undelivered() {
        assert_eq!(loneliness_ratio(4, 1), 0.75);
        assert_eq!(loneliness_ratio(4, 0), 1.0);
    }

    #[test]
    fn round5_rounds_half_away() {
        assert_eq!(round5(2.0 / 3.0), 0.66667);
        assert_eq!(round5(0.5), 0.5);
    }

    #[test]
    fn counters_increment() {
        let mut c = SeekingController::new(config(), SubscriptionRegistry::new());
        c.record_production();
        c.record_production();
        c.record_delivery(1);
        assert_eq!(c.data().produced_ticks, 2);
        assert_eq!(c.data().delivered_ticks, 1);
    }

    #[test]
    fn huge_delivery_counts_saturate() {
        let mut c = SeekingController::new(config(), SubscriptionRegistry::new());
        c.record_production();
        c.record_delivery(u64::MAX);
        c.record_delivery(1);
        assert_eq!(c.data().delivered_ticks, u64::MAX);
        assert!(c.tick(0.0, BeaconHints::new()).is_none());
        assert_eq!(c.data().loneliness_ratio, 0.0);
    }

    #[test]
    fn first_tick_starts_lonely_timer() {
        let mut c = SeekingController::new(config(), SubscriptionRegistry::new());
        assert!(c.tick(100.0, BeaconHints::new()).is_none());
        assert_eq!(c.data().first_lonely_ts, Some(100.0));
        assert_eq!(c.state(), SeekingState::Idle);
    }

    #[test]
    fn escalate_interval_applies_in_escalate() {
        let mut c = SeekingController::new(config(), SubscriptionRegistry::new());
        c.tick(0.0, BeaconHints::new());
        assert!(c.tick(20.0, BeaconHints::new()).is_some());
        assert!(c.tick(21.0, BeaconHints::new()).is_none());
        let b = c.tick(22.0, BeaconHints::new()).unwrap();
        assert_eq!(b.state, SeekingState::SeekingEscalate);
        assert_eq!(b.beacon_n, 2);
    }
}
