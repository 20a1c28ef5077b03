pub mod beacons;
pub mod env;
pub mod runtime_dir;
pub mod subscriptions;
pub mod target_stream;
pub mod version;
