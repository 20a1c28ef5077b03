use crate::context::HealthContext;
use crate::registry::{CheckOutcome, HealthCheck, HealthError};
use seekbeacon_core::BeaconHeader;
use seekbeacon_store::BeaconStore;

const TARGET_WINDOW: usize = 400;

/// Informational: has the configured target stream announced itself yet?
pub struct TargetStreamCheck;

impl HealthCheck for TargetStreamCheck {
    fn name(&self) -> &str {
        "target_stream"
    }

    fn order(&self) -> i32 {
        80
    }

    fn run(&self, ctx: &HealthContext) -> Result<CheckOutcome, HealthError> {
        let Some(target) = &ctx.target_stream else {
            return Ok(CheckOutcome::warn("TARGET_STREAM_ID unset"));
        };
        if !ctx.beacon_path.exists() {
            return Ok(CheckOutcome::warn("no beacons file"));
        }
        let read = match BeaconStore::new(&ctx.beacon_path).read_recent::<BeaconHeader>(TARGET_WINDOW) {
            Ok(r) => r,
            Err(e) => return Ok(CheckOutcome::fail(format!("read error: {e}"))),
        };

        let found = read
            .records
            .iter()
            .any(|b| b.stream_id == *target && b.is_seeking());
        Ok(if found {
            CheckOutcome::ok(target.as_str())
        } else {
            CheckOutcome::warn(format!("no seeking beacon for {target}"))
        })
    }
}
