//! Tests for seekbeacon-core: identifiers, states, beacon wire format, registry, config

use seekbeacon_core::*;
use std::time::Duration;

// ===========================================================================
// StreamId / ListenerId
// ===========================================================================

#[test]
fn stream_id_display_and_from() {
    let id: StreamId = "alpha".into();
    assert_eq!(id.as_str(), "alpha");
    assert_eq!(format!("{}", id), "alpha");
    let id2: StreamId = String::from("alpha").into();
    assert_eq!(id, id2);
}

#[test]
fn stream_id_serializes_as_plain_string() {
    let id = StreamId::new("s1");
    assert_eq!(serde_json::to_string(&id).unwrap(), r#""s1""#);
}

// ===========================================================================
// SeekingState
// ===========================================================================

#[test]
fn seeking_state_wire_names() {
    let cases = [
        (SeekingState::Idle, "idle"),
        (SeekingState::SeekingLow, "seeking_low"),
        (SeekingState::SeekingEscalate, "seeking_escalate"),
        (SeekingState::Attached, "attached"),
        (SeekingState::Shutdown, "shutdown"),
        (SeekingState::Commons, "commons"),
    ];
    for (state, name) in cases {
        assert_eq!(state.as_str(), name);
        assert_eq!(serde_json::to_string(&state).unwrap(), format!("\"{}\"", name));
    }
}

#[test]
fn only_low_and_escalate_are_seeking() {
    assert!(SeekingState::SeekingLow.is_seeking());
    assert!(SeekingState::SeekingEscalate.is_seeking());
    assert!(!SeekingState::Idle.is_seeking());
    assert!(!SeekingState::Attached.is_seeking());
}

#[test]
fn seeking_family_matches_foreign_names() {
    assert!(is_seeking_state("seeking_init"));
    assert!(!is_seeking_state("attached"));
    assert!(!is_seeking_state(""));
}

#[test]
fn default_state_is_idle() {
    assert_eq!(SeekingState::default(), SeekingState::Idle);
}

// ===========================================================================
// Beacon wire format
// ===========================================================================

fn sample_beacon() -> Beacon {
    Beacon {
        ts: "1970-01-01T00:00:12.000Z".into(),
        stream_id: "s1".into(),
        state: SeekingState::SeekingLow,
        seq: 4,
        produced_ticks: 4,
        delivered_ticks: 2,
        loneliness_ratio: 0.5,
        mode: "markov".into(),
        entropy_profile: "unknown".into(),
        tempo_range: [1.0, 4.0],
        tokens_hint: vec!["flux".into()],
        spore: String::new(),
        beacon_n: 1,
    }
}

#[test]
fn beacon_uses_tempo_range_s_on_the_wire() {
    let json = serde_json::to_value(sample_beacon()).unwrap();
    assert_eq!(json["tempo_range_s"], serde_json::json!([1.0, 4.0]));
    assert!(json.get("tempo_range").is_none());
    assert_eq!(json["state"], "seeking_low");
}

#[test]
fn beacon_accepts_tempo_range_alias() {
    let mut json = serde_json::to_value(sample_beacon()).unwrap();
    let obj = json.as_object_mut().unwrap();
    let tempo = obj.remove("tempo_range_s").unwrap();
    obj.insert("tempo_range".into(), tempo);
    let back: Beacon = serde_json::from_value(json).unwrap();
    assert_eq!(back, sample_beacon());
}

#[test]
fn header_from_beacon_keeps_selection_fields() {
    let header = BeaconHeader::from(&sample_beacon());
    assert_eq!(header.stream_id.as_str(), "s1");
    assert_eq!(header.state, "seeking_low");
    assert_eq!(header.seq, Some(4));
    assert_eq!(header.beacon_n, Some(1));
    assert!(header.is_seeking());
}

#[test]
fn header_parses_minimal_record() {
    let header: BeaconHeader =
        serde_json::from_str(r#"{"stream_id":"a","state":"seeking_low"}"#).unwrap();
    assert_eq!(header.seq, None);
    assert_eq!(header.beacon_n, None);
}

#[test]
fn header_rejects_missing_state() {
    assert!(serde_json::from_str::<BeaconHeader>(r#"{"stream_id":"a"}"#).is_err());
}

// ===========================================================================
// SubscriptionRegistry
// ===========================================================================

#[test]
fn registry_subscribe_suppresses_duplicates() {
    let mut reg = SubscriptionRegistry::new();
    assert!(reg.subscribe("a".into(), "L1".into()));
    assert!(!reg.subscribe("a".into(), "L1".into()));
    assert!(reg.subscribe("a".into(), "L2".into()));
    let names: Vec<&str> = reg.listeners(&"a".into()).iter().map(|l| l.as_str()).collect();
    assert_eq!(names, vec!["L1", "L2"]);
}

#[test]
fn registry_attachment_requires_a_listener() {
    let reg: SubscriptionRegistry = serde_json::from_str(r#"{"a":["L1"],"b":[]}"#).unwrap();
    assert!(reg.is_attached(&"a".into()));
    assert!(!reg.is_attached(&"b".into()));
    assert!(!reg.is_attached(&"c".into()));
    assert_eq!(reg.stream_count(), 2);
}

#[test]
fn registry_rejects_non_object_root() {
    assert!(serde_json::from_str::<SubscriptionRegistry>("[1,2]").is_err());
    assert!(serde_json::from_str::<SubscriptionRegistry>(r#"{"a":"L1"}"#).is_err());
}

#[test]
fn registry_serializes_as_object() {
    let mut reg = SubscriptionRegistry::new();
    reg.subscribe("a".into(), "L1".into());
    assert_eq!(serde_json::to_string(&reg).unwrap(), r#"{"a":["L1"]}"#);
}

// ===========================================================================
// SeekingConfig
// ===========================================================================

#[test]
fn default_config_is_valid() {
    SeekingConfig::default().validate().unwrap();
}

#[test]
fn config_rejects_unordered_thresholds() {
    let cfg = SeekingConfig::new("s").with_thresholds(
        Duration::from_secs(20),
        Duration::from_secs(10),
        Duration::from_secs(30),
    );
    assert!(matches!(cfg.validate(), Err(Error::Config(_))));
}

#[test]
fn config_rejects_slow_escalation_interval() {
    let cfg = SeekingConfig::new("s").with_intervals(Duration::from_secs(5), Duration::from_secs(6));
    assert!(matches!(cfg.validate(), Err(Error::Config(_))));
}

#[test]
fn config_rejects_empty_stream_id() {
    assert!(SeekingConfig::new("").validate().is_err());
}
