//! Registry file check. An unreadable file or a non-object root is FAIL.
//! Entries that are not arrays of strings are WARN; the controller and the
//! listeners skip those entries and keep the rest.

use crate::context::HealthContext;
use crate::registry::{CheckOutcome, HealthCheck, HealthError};
use serde_json::Value;

pub struct SubscriptionsFileCheck;

fn is_listener_list(v: &Value) -> bool {
    v.as_array().is_some_and(|items| items.iter().all(Value::is_string))
}

impl HealthCheck for SubscriptionsFileCheck {
    fn name(&self) -> &str {
        "subscriptions_file"
    }

    fn order(&self) -> i32 {
        70
    }

    fn run(&self, ctx: &HealthContext) -> Result<CheckOutcome, HealthError> {
        let path = &ctx.subscriptions_path;
        if !path.exists() {
            return Ok(CheckOutcome::warn("missing"));
        }
        let data: Value = match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
        {
            Ok(v) => v,
            Err(e) => return Ok(CheckOutcome::fail(format!("parse error: {e}"))),
        };
        let Some(streams) = data.as_object() else {
            return Ok(CheckOutcome::fail("root not object"));
        };

        let bad = streams.values().filter(|v| !is_listener_list(v)).count();
        if bad > 0 {
            return Ok(CheckOutcome::warn(format!(
                "streams={} malformed_entries={bad}",
                streams.len()
            )));
        }
        Ok(CheckOutcome::ok(format!("streams={}", streams.len())))
    }
}
