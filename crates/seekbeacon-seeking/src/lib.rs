//! Seekbeacon Seeking - the per-stream urgency state machine
//!
//! The producer calls [`SeekingController::tick`] on every loop iteration and
//! appends whatever beacon it returns. Attachment is observed through the
//! subscription registry; everything else is local counters and timers.

pub mod controller;
pub mod source;

pub use controller::{loneliness_ratio, BeaconHints, SeekingController, SeekingStateData};
pub use source::RegistrySource;
