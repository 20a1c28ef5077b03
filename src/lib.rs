//! Seekbeacon - streams that announce they want a consumer
//!
//! A producer emits filler events and, while nobody is subscribed, appends
//! beacons of rising urgency to a shared log. Listeners tail that log and
//! claim a stream by writing themselves into the subscription registry.
//! The health tool checks the shared files.
//!
//! The state machine, storage, listener and health checklist live in the
//! member crates; this crate holds the noise generator, the producer loop
//! and the CLI glue for the binaries.

pub mod cli;
pub mod noise;
pub mod producer;
pub mod telemetry;

pub use noise::{NoiseConfig, NoiseGenerator, NoiseMode};
pub use producer::Producer;
