//! Seekbeacon Store - file-backed beacon log and subscription registry
//!
//! Both stores return structured results. Callers decide what to log and
//! which safe default to fall back to.

pub mod beacon_log;
pub mod error;
pub mod subscriptions;

pub use beacon_log::{BeaconStore, TailRead};
pub use error::{Result, StoreError};
pub use subscriptions::SubscriptionStore;
