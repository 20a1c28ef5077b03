//! Beacon log checks: presence, parse ratio, structural shape.

use crate::context::HealthContext;
use crate::registry::{CheckOutcome, HealthCheck, HealthError};
use seekbeacon_store::BeaconStore;
use serde_json::{Map, Value};

const PARSE_WINDOW: usize = 500;
const SHAPE_WINDOW: usize = 50;

type JsonObject = Map<String, Value>;

fn is_structural(obj: &JsonObject) -> bool {
    obj.contains_key("stream_id") && obj.contains_key("state")
}

pub struct BeaconsFileCheck;

impl HealthCheck for BeaconsFileCheck {
    fn name(&self) -> &str {
        "beacons_file"
    }

    fn order(&self) -> i32 {
        40
    }

    fn run(&self, ctx: &HealthContext) -> Result<CheckOutcome, HealthError> {
        let path = &ctx.beacon_path;
        if !path.exists() {
            return Ok(CheckOutcome::warn(format!("missing {}", path.display())));
        }
        if !path.is_file() {
            return Ok(CheckOutcome::fail(format!("not a file: {}", path.display())));
        }
        let size = std::fs::metadata(path)?.len();
        Ok(CheckOutcome::ok(format!("{size} bytes")))
    }
}

pub struct BeaconsParseCheck;

impl HealthCheck for BeaconsParseCheck {
    fn name(&self) -> &str {
        "beacons_parse"
    }

    fn order(&self) -> i32 {
        50
    }

    fn run(&self, ctx: &HealthContext) -> Result<CheckOutcome, HealthError> {
        if !ctx.beacon_path.exists() {
            return Ok(CheckOutcome::warn("no file"));
        }
        let read = match BeaconStore::new(&ctx.beacon_path).read_recent::<JsonObject>(PARSE_WINDOW) {
            Ok(r) => r,
            Err(e) => return Ok(CheckOutcome::fail(format!("read error: {e}"))),
        };

        let good = read.records.len();
        let bad = read.malformed;
        let total = good + bad;
        if total == 0 {
            return Ok(CheckOutcome::warn("empty"));
        }
        let structural = read.records.iter().filter(|o| is_structural(o)).count();
        let ratio = good as f64 / total as f64;
        let detail = format!(
            "good={good} bad={bad} ratio={:.2}% structural={structural}",
            ratio * 100.0
        );
        Ok(if ratio > 0.95 {
            CheckOutcome::ok(detail)
        } else if ratio > 0.7 {
            CheckOutcome::warn(detail)
        } else {
            CheckOutcome::fail(detail)
        })
    }
}

pub struct BeaconShapeCheck;

impl HealthCheck for BeaconShapeCheck {
    fn name(&self) -> &str {
        "beacon_shape"
    }

    fn order(&self) -> i32 {
        60
    }

    fn run(&self, ctx: &HealthContext) -> Result<CheckOutcome, HealthError> {
        if !ctx.beacon_path.exists() {
            return Ok(CheckOutcome::warn("no file"));
        }
        let read = match BeaconStore::new(&ctx.beacon_path).read_recent::<JsonObject>(SHAPE_WINDOW) {
            Ok(r) => r,
            Err(e) => return Ok(CheckOutcome::fail(format!("read error: {e}"))),
        };

        let scanned = read.scanned();
        if scanned == 0 {
            return Ok(CheckOutcome::warn("no lines"));
        }
        let structural = read.records.iter().filter(|o| is_structural(o)).count();
        let pct = structural as f64 / scanned as f64;
        let detail = format!("{structural}/{scanned} ({:.0}%)", pct * 100.0);
        Ok(if pct > 0.9 {
            CheckOutcome::ok(detail)
        } else {
            CheckOutcome::warn(detail)
        })
    }
}
