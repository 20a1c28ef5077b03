use crate::context::HealthContext;
use crate::registry::{CheckOutcome, HealthCheck, HealthError};

pub struct VersionCheck;

impl HealthCheck for VersionCheck {
    fn name(&self) -> &str {
        "version"
    }

    fn order(&self) -> i32 {
        10
    }

    fn run(&self, _ctx: &HealthContext) -> Result<CheckOutcome, HealthError> {
        Ok(CheckOutcome::ok(format!("seekbeacon {}", env!("CARGO_PKG_VERSION"))))
    }
}
