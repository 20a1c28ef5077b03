//! Integration tests for seekbeacon-listener: poll cycles against real files

use seekbeacon_core::{ListenerId, StreamId, SubscriptionRegistry};
use seekbeacon_listener::{ListenerAgent, ListenerConfig, PollOutcome};
use seekbeacon_store::{BeaconStore, SubscriptionStore};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    _tmp: TempDir,
    beacons: PathBuf,
    subs: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let beacons = tmp.path().join("beacons.jsonl");
        let subs = tmp.path().join("subscriptions.json");
        Self { _tmp: tmp, beacons, subs }
    }

    fn write_beacons(&self, lines: &[serde_json::Value]) {
        let store = BeaconStore::new(&self.beacons);
        for l in lines {
            store.append_record(l).unwrap();
        }
    }

    fn agent(&self, id: &str, target: Option<&str>) -> ListenerAgent {
        let config = ListenerConfig {
            id: ListenerId::new(id),
            poll_interval: Duration::from_millis(10),
            tail_n: 250,
            target_stream: target.map(StreamId::new),
        };
        ListenerAgent::new(
            config,
            BeaconStore::new(&self.beacons),
            SubscriptionStore::new(&self.subs),
        )
    }

    fn registry(&self) -> SubscriptionRegistry {
        SubscriptionStore::new(&self.subs).load().unwrap()
    }
}

// ============================================================
// Claiming
// ============================================================

#[test]
fn second_listener_sees_stream_claimed() {
    let fx = Fixture::new();
    fx.write_beacons(&[serde_json::json!({"stream_id": "a", "state": "seeking_low"})]);

    let mut first = fx.agent("L1", None);
    assert_eq!(
        first.poll_once(),
        PollOutcome::Subscribed {
            stream: "a".into(),
            beacon_n: None,
            seq: None
        }
    );
    let reg = fx.registry();
    assert_eq!(reg.listeners(&"a".into()), &[ListenerId::new("L1")]);
    assert!(first.claimed().contains(&StreamId::new("a")));

    let mut second = fx.agent("L2", None);
    assert_eq!(second.poll_once(), PollOutcome::NothingEligible);
    assert_eq!(fx.registry(), reg);
}

#[test]
fn subscribed_outcome_reports_beacon_counters() {
    let fx = Fixture::new();
    fx.write_beacons(&[
        serde_json::json!({"stream_id": "a", "state": "seeking_low", "seq": 4, "beacon_n": 1}),
        serde_json::json!({"stream_id": "a", "state": "seeking_escalate", "seq": 9, "beacon_n": 2}),
    ]);
    let mut agent = fx.agent("L1", None);
    assert_eq!(
        agent.poll_once(),
        PollOutcome::Subscribed {
            stream: "a".into(),
            beacon_n: Some(2),
            seq: Some(9)
        }
    );
}

#[test]
fn missing_log_means_no_beacons() {
    let fx = Fixture::new();
    let mut agent = fx.agent("L1", None);
    assert_eq!(agent.poll_once(), PollOutcome::NoBeacons);
    assert!(!fx.subs.exists());
}

#[test]
fn only_non_seeking_beacons_is_nothing_eligible() {
    let fx = Fixture::new();
    fx.write_beacons(&[serde_json::json!({"stream_id": "a", "state": "attached"})]);
    assert_eq!(fx.agent("L1", None).poll_once(), PollOutcome::NothingEligible);
}

#[test]
fn target_listener_idles_once_subscribed() {
    let fx = Fixture::new();
    fx.write_beacons(&[
        serde_json::json!({"stream_id": "a", "state": "seeking_low"}),
        serde_json::json!({"stream_id": "b", "state": "seeking_low"}),
    ]);
    let mut agent = fx.agent("L1", Some("a"));
    assert!(matches!(agent.poll_once(), PollOutcome::Subscribed { ref stream, .. } if stream.as_str() == "a"));
    assert_eq!(agent.poll_once(), PollOutcome::AlreadySubscribed);
    assert!(!fx.registry().is_attached(&"b".into()));
}

#[test]
fn malformed_registry_is_replaced_on_claim() {
    let fx = Fixture::new();
    std::fs::write(&fx.subs, "not json at all").unwrap();
    fx.write_beacons(&[serde_json::json!({"stream_id": "a", "state": "seeking_low"})]);

    let mut agent = fx.agent("L1", None);
    assert!(matches!(agent.poll_once(), PollOutcome::Subscribed { .. }));
    assert!(fx.registry().is_attached(&"a".into()));
}

#[test]
fn bad_entry_does_not_erase_other_claims() {
    let fx = Fixture::new();
    std::fs::write(&fx.subs, r#"{"a": ["L1"], "b": 5}"#).unwrap();
    fx.write_beacons(&[serde_json::json!({"stream_id": "c", "state": "seeking_low"})]);

    let mut agent = fx.agent("L2", None);
    assert_eq!(
        agent.poll_once(),
        PollOutcome::Subscribed {
            stream: "c".into(),
            beacon_n: None,
            seq: None
        }
    );
    let reg = fx.registry();
    assert_eq!(reg.listeners(&"a".into()), &[ListenerId::new("L1")]);
    assert_eq!(reg.listeners(&"c".into()), &[ListenerId::new("L2")]);
    assert!(!reg.is_attached(&"b".into()));
}

#[test]
fn persist_failure_does_not_record_claim() {
    let fx = Fixture::new();
    fx.write_beacons(&[serde_json::json!({"stream_id": "a", "state": "seeking_low"})]);
    // A directory where the registry file should be: loads fail, rename fails.
    std::fs::create_dir(&fx.subs).unwrap();
    std::fs::write(fx.subs.join("occupant"), "x").unwrap();

    let mut agent = fx.agent("L1", None);
    match agent.poll_once() {
        PollOutcome::PersistFailed { stream, reason } => {
            assert_eq!(stream.as_str(), "a");
            assert!(!reason.is_empty());
        }
        other => panic!("expected PersistFailed, got {other:?}"),
    }
    assert!(agent.claimed().is_empty());

    // Retried and succeeds once the obstruction is gone.
    std::fs::remove_dir_all(&fx.subs).unwrap();
    assert!(matches!(agent.poll_once(), PollOutcome::Subscribed { .. }));
    assert_eq!(agent.claimed().len(), 1);
}

#[test]
fn racing_listeners_from_same_snapshot_both_persist() {
    let fx = Fixture::new();
    fx.write_beacons(&[serde_json::json!({"stream_id": "a", "state": "seeking_low"})]);
    let store = SubscriptionStore::new(&fx.subs);

    // Both read the empty registry before either writes.
    let mut snap1 = store.load().unwrap();
    let mut snap2 = store.load().unwrap();
    snap1.subscribe("a".into(), "L1".into());
    snap2.subscribe("a".into(), "L2".into());
    store.save(&snap1).unwrap();
    store.save(&snap2).unwrap();

    // Later write wins; the file stays well-formed.
    assert_eq!(store.load().unwrap().listeners(&"a".into()), &[ListenerId::new("L2")]);
}

// ============================================================
// Run loop
// ============================================================

#[tokio::test]
async fn run_until_stops_on_shutdown_and_keeps_claims() {
    let fx = Fixture::new();
    fx.write_beacons(&[serde_json::json!({"stream_id": "a", "state": "seeking_escalate"})]);

    let agent = fx.agent("L1", None);
    let agent = agent
        .run_until(tokio::time::sleep(Duration::from_millis(50)))
        .await;
    assert!(agent.claimed().contains(&StreamId::new("a")));
    assert!(fx.registry().is_attached(&"a".into()));
}
