//! Where the controller reads attachment from.

use seekbeacon_core::SubscriptionRegistry;
use seekbeacon_store::{StoreError, SubscriptionStore};
use tracing::debug;

/// Anything that can produce a snapshot of the subscription registry.
pub trait RegistrySource {
    fn load_registry(&self) -> Result<SubscriptionRegistry, StoreError>;

    /// Human-readable origin used in diagnostics.
    fn describe(&self) -> String {
        String::from("registry")
    }
}

impl RegistrySource for SubscriptionStore {
    fn load_registry(&self) -> Result<SubscriptionRegistry, StoreError> {
        let (registry, skipped) = self.load_counted()?;
        if skipped > 0 {
            debug!(path = %self.path().display(), skipped, "skipped malformed registry entries");
        }
        Ok(registry)
    }

    fn describe(&self) -> String {
        self.path().display().to_string()
    }
}

/// A fixed in-memory snapshot.
impl RegistrySource for SubscriptionRegistry {
    fn load_registry(&self) -> Result<SubscriptionRegistry, StoreError> {
        Ok(self.clone())
    }
}
