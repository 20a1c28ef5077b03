//! Seekbeacon Listener - claims streams that are seeking a consumer
//!
//! Each poll reads a bounded window of recent beacons and the current
//! subscription registry, picks the newest unclaimed seeking beacon, and
//! writes this listener into the registry.

pub mod agent;
pub mod selection;

pub use agent::{ListenerAgent, ListenerConfig, PollOutcome};
pub use selection::select_beacon;
