//! Core types for Seekbeacon

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix shared by every urgency-signaling state name on the wire.
pub const SEEKING_PREFIX: &str = "seeking_";

/// Logical stream identifier. Key of the subscription registry and of beacons.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(String);

impl StreamId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for StreamId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for StreamId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identity a listener registers under.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(String);

impl ListenerId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// `listener-` followed by 8 random hex digits.
    pub fn generate() -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("listener-{}", &hex[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ListenerId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ListenerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Urgency state of a stream.
///
/// `Shutdown` and `Commons` are declared so they round-trip on the wire,
/// but no transition produces them yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekingState {
    Idle,
    SeekingLow,
    SeekingEscalate,
    Attached,
    Shutdown,
    Commons,
}

impl SeekingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SeekingLow => "seeking_low",
            Self::SeekingEscalate => "seeking_escalate",
            Self::Attached => "attached",
            Self::Shutdown => "shutdown",
            Self::Commons => "commons",
        }
    }

    /// States allowed to emit beacons.
    pub fn is_seeking(&self) -> bool {
        matches!(self, Self::SeekingLow | Self::SeekingEscalate)
    }
}

impl Default for SeekingState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for SeekingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True for any state name in the `seeking_*` family, including ones this
/// crate does not define.
pub fn is_seeking_state(state: &str) -> bool {
    state.starts_with(SEEKING_PREFIX)
}

/// A single announcement of a stream's urgency state and counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    pub ts: String,
    pub stream_id: StreamId,
    pub state: SeekingState,
    pub seq: u64,
    pub produced_ticks: u64,
    pub delivered_ticks: u64,
    pub loneliness_ratio: f64,
    pub mode: String,
    pub entropy_profile: String,
    #[serde(rename = "tempo_range_s", alias = "tempo_range")]
    pub tempo_range: [f64; 2],
    pub tokens_hint: Vec<String>,
    pub spore: String,
    pub beacon_n: u64,
}

/// The fields a listener needs to decide on a beacon.
///
/// Deliberately looser than [`Beacon`]: the state is kept as a raw string
/// and counters are optional, so records written by other tools still parse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeaconHeader {
    pub stream_id: StreamId,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beacon_n: Option<u64>,
}

impl BeaconHeader {
    pub fn is_seeking(&self) -> bool {
        is_seeking_state(&self.state)
    }
}

impl From<&Beacon> for BeaconHeader {
    fn from(b: &Beacon) -> Self {
        Self {
            stream_id: b.stream_id.clone(),
            state: b.state.as_str().to_string(),
            seq: Some(b.seq),
            beacon_n: Some(b.beacon_n),
        }
    }
}

/// Stream id -> ordered listener ids. Grows only; duplicates suppressed on insert.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionRegistry {
    streams: BTreeMap<StreamId, Vec<ListenerId>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a loose JSON object, keeping entries whose value is an array
    /// of strings. Returns the registry and the number of entries skipped.
    pub fn from_lenient(map: serde_json::Map<String, serde_json::Value>) -> (Self, usize) {
        let mut streams = BTreeMap::new();
        let mut skipped = 0;
        for (stream, value) in map {
            match serde_json::from_value::<Vec<ListenerId>>(value) {
                Ok(list) => {
                    streams.insert(StreamId::new(stream), list);
                }
                Err(_) => skipped += 1,
            }
        }
        (Self { streams }, skipped)
    }

    pub fn listeners(&self, stream: &StreamId) -> &[ListenerId] {
        self.streams.get(stream).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A stream is attached once it has at least one listener.
    pub fn is_attached(&self, stream: &StreamId) -> bool {
        !self.listeners(stream).is_empty()
    }

    pub fn contains(&self, stream: &StreamId, listener: &ListenerId) -> bool {
        self.listeners(stream).contains(listener)
    }

    /// Append `listener` to the stream's list. Returns false if it was already there.
    pub fn subscribe(&mut self, stream: StreamId, listener: ListenerId) -> bool {
        let list = self.streams.entry(stream).or_default();
        if list.contains(&listener) {
            return false;
        }
        list.push(listener);
        true
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StreamId, &[ListenerId])> {
        self.streams.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

/// Unix seconds to ISO-8601 UTC with millisecond precision and a literal `Z`.
/// Sub-millisecond digits are truncated.
pub fn iso_timestamp(unix_secs: f64) -> String {
    let millis = (unix_secs * 1000.0).floor() as i64;
    let dt: DateTime<Utc> = DateTime::from_timestamp_millis(millis).unwrap_or_default();
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Current wall clock as Unix seconds.
pub fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_timestamp_epoch() {
        assert_eq!(iso_timestamp(0.0), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn iso_timestamp_truncates_to_millis() {
        assert_eq!(iso_timestamp(12.3456), "1970-01-01T00:00:12.345Z");
    }

    #[test]
    fn lenient_registry_skips_bad_entries() {
        let raw = serde_json::json!({
            "s1": ["listenerA"],
            "s2": null,
            "s3": [1, 2],
            "s4": "listenerB",
            "s5": []
        });
        let serde_json::Value::Object(map) = raw else {
            unreachable!()
        };
        let (reg, skipped) = SubscriptionRegistry::from_lenient(map);
        assert_eq!(skipped, 3);
        assert_eq!(reg.stream_count(), 2);
        assert!(reg.is_attached(&"s1".into()));
        assert!(!reg.is_attached(&"s5".into()));
    }

    #[test]
    fn listener_id_generate_shape() {
        let id = ListenerId::generate();
        assert!(id.as_str().starts_with("listener-"));
        assert_eq!(id.as_str().len(), "listener-".len() + 8);
    }
}
