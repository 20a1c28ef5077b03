//! Listener polling agent

use crate::selection::select_beacon;
use seekbeacon_core::{BeaconHeader, ListenerId, StreamId, SubscriptionRegistry};
use seekbeacon_store::{BeaconStore, SubscriptionStore};
use serde::Serialize;
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub id: ListenerId,
    /// Sleep between cycles, whatever the outcome.
    pub poll_interval: Duration,
    /// Beacon window size.
    pub tail_n: usize,
    /// Only claim this stream when set.
    pub target_stream: Option<StreamId>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            id: ListenerId::generate(),
            poll_interval: Duration::from_millis(2500),
            tail_n: 250,
            target_stream: None,
        }
    }
}

/// What a single poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    /// Already listed under the target stream.
    AlreadySubscribed,
    /// The beacon window was empty or unreadable.
    NoBeacons,
    NothingEligible,
    Subscribed {
        stream: StreamId,
        beacon_n: Option<u64>,
        seq: Option<u64>,
    },
    /// Registry write failed. The claim is retried next cycle.
    PersistFailed { stream: StreamId, reason: String },
}

pub struct ListenerAgent {
    config: ListenerConfig,
    beacons: BeaconStore,
    subscriptions: SubscriptionStore,
    claimed: BTreeSet<StreamId>,
}

impl ListenerAgent {
    pub fn new(config: ListenerConfig, beacons: BeaconStore, subscriptions: SubscriptionStore) -> Self {
        Self {
            config,
            beacons,
            subscriptions,
            claimed: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &ListenerId {
        &self.config.id
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Streams this agent has successfully written itself into.
    pub fn claimed(&self) -> &BTreeSet<StreamId> {
        &self.claimed
    }

    pub fn poll_once(&mut self) -> PollOutcome {
        let mut registry = self.load_registry();

        if let Some(target) = &self.config.target_stream {
            if registry.contains(target, &self.config.id) {
                return PollOutcome::AlreadySubscribed;
            }
        }

        let window = match self.beacons.read_recent::<BeaconHeader>(self.config.tail_n) {
            Ok(w) => w,
            Err(e) => {
                warn!(listener = %self.config.id, error = %e, "beacon log unreadable");
                return PollOutcome::NoBeacons;
            }
        };
        if window.malformed > 0 {
            debug!(listener = %self.config.id, malformed = window.malformed, "skipped malformed beacon lines");
        }
        if window.is_empty() {
            return PollOutcome::NoBeacons;
        }

        let Some(chosen) = select_beacon(&window.records, &registry, self.config.target_stream.as_ref()) else {
            return PollOutcome::NothingEligible;
        };
        let stream = chosen.stream_id.clone();
        let (beacon_n, seq) = (chosen.beacon_n, chosen.seq);

        if !registry.subscribe(stream.clone(), self.config.id.clone()) {
            return PollOutcome::AlreadySubscribed;
        }

        match self.subscriptions.save(&registry) {
            Ok(()) => {
                self.claimed.insert(stream.clone());
                info!(listener = %self.config.id, stream = %stream, ?beacon_n, ?seq, "subscribed");
                PollOutcome::Subscribed { stream, beacon_n, seq }
            }
            Err(e) => {
                warn!(listener = %self.config.id, stream = %stream, error = %e, "subscription write failed");
                PollOutcome::PersistFailed {
                    stream,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Poll until `shutdown` resolves. The sleep between cycles is interruptible.
    pub async fn run_until<F>(mut self, shutdown: F) -> Self
    where
        F: Future<Output = ()>,
    {
        info!(
            listener = %self.config.id,
            beacon_path = %self.beacons.path().display(),
            subscriptions_path = %self.subscriptions.path().display(),
            target = ?self.config.target_stream.as_ref().map(StreamId::as_str),
            "listener started"
        );

        tokio::pin!(shutdown);
        loop {
            let outcome = self.poll_once();
            debug!(listener = %self.config.id, ?outcome, "poll cycle");

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = &mut shutdown => break,
            }
        }

        info!(listener = %self.config.id, claimed = self.claimed.len(), "listener exit");
        self
    }

    /// Poll until Ctrl-C.
    pub async fn run(self) -> Self {
        self.run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    fn load_registry(&self) -> SubscriptionRegistry {
        match self.subscriptions.load_counted() {
            Ok((r, 0)) => r,
            Ok((r, skipped)) => {
                warn!(listener = %self.config.id, skipped, "ignoring malformed registry entries");
                r
            }
            Err(e) => {
                warn!(listener = %self.config.id, error = %e, "subscription registry unreadable, treating as empty");
                SubscriptionRegistry::new()
            }
        }
    }
}
