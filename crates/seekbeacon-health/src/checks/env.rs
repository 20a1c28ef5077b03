use crate::context::HealthContext;
use crate::registry::{CheckOutcome, HealthCheck, HealthError};

pub struct EnvCheck;

impl HealthCheck for EnvCheck {
    fn name(&self) -> &str {
        "env:variables"
    }

    fn order(&self) -> i32 {
        20
    }

    fn run(&self, ctx: &HealthContext) -> Result<CheckOutcome, HealthError> {
        let present = ctx.env.iter().filter(|(_, set)| *set).count();
        let missing: Vec<&str> = ctx
            .env
            .iter()
            .filter(|(_, set)| !*set)
            .map(|(k, _)| k.as_str())
            .collect();

        if missing.is_empty() {
            Ok(CheckOutcome::ok(format!("{present} vars")))
        } else {
            Ok(CheckOutcome::warn(format!(
                "present={present} missing={}",
                missing.join(",")
            )))
        }
    }
}
