//! Seekbeacon Health - ordered checklist over the shared state files
//!
//! Each check is a self-contained module in src/checks/ implementing
//! [`HealthCheck`]. To add a check: create the file, implement the trait,
//! register it in [`create_default_registry`].

pub mod checks;
pub mod context;
pub mod registry;
pub mod report;

pub use context::{HealthContext, WATCHED_ENV};
pub use registry::{CheckOutcome, HealthCheck, HealthError, HealthRegistry};
pub use report::{HealthItem, HealthReport, HealthStatus};

/// The standard checklist, in run order.
pub fn create_default_registry() -> HealthRegistry {
    let mut registry = HealthRegistry::new();

    registry.register(checks::version::VersionCheck);
    registry.register(checks::env::EnvCheck);
    registry.register(checks::runtime_dir::RuntimeDirCheck);

    // --- Beacon log ---
    registry.register(checks::beacons::BeaconsFileCheck);
    registry.register(checks::beacons::BeaconsParseCheck);
    registry.register(checks::beacons::BeaconShapeCheck);

    registry.register(checks::subscriptions::SubscriptionsFileCheck);
    registry.register(checks::target_stream::TargetStreamCheck);

    registry
}
