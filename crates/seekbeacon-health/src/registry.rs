//! Check registry and trait definitions

use crate::context::HealthContext;
use crate::report::{HealthReport, HealthStatus};
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CheckOutcome {
    pub status: HealthStatus,
    pub detail: String,
}

impl CheckOutcome {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self { status: HealthStatus::Ok, detail: detail.into() }
    }

    pub fn warn(detail: impl Into<String>) -> Self {
        Self { status: HealthStatus::Warn, detail: detail.into() }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self { status: HealthStatus::Fail, detail: detail.into() }
    }
}

/// The HealthCheck trait. Implement this to add a check to the list.
pub trait HealthCheck: Send + Sync {
    /// Name shown in the report (e.g. "beacons_parse").
    fn name(&self) -> &str;

    /// Smaller runs earlier. Ties keep registration order.
    fn order(&self) -> i32 {
        100
    }

    /// A non-OK result from a fatal check fails the whole run.
    fn fatal(&self) -> bool {
        false
    }

    fn run(&self, ctx: &HealthContext) -> Result<CheckOutcome, HealthError>;
}

#[derive(Default)]
pub struct HealthRegistry {
    checks: Vec<Box<dyn HealthCheck>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, check: impl HealthCheck + 'static) {
        self.checks.push(Box::new(check));
    }

    /// Names in run order.
    pub fn list(&self) -> Vec<&str> {
        self.ordered().into_iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check in order, timing each one.
    pub fn run_all(&self, ctx: &HealthContext) -> HealthReport {
        let mut report = HealthReport::new();
        for check in self.ordered() {
            let start = Instant::now();
            let outcome = check
                .run(ctx)
                .unwrap_or_else(|e| CheckOutcome::fail(format!("error: {e}")));
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            debug!(check = check.name(), status = %outcome.status, elapsed_ms, "health check finished");
            report.add(check.name(), outcome.status, outcome.detail, check.fatal(), Some(elapsed_ms));
        }
        report
    }

    fn ordered(&self) -> Vec<&dyn HealthCheck> {
        let mut ordered: Vec<&dyn HealthCheck> = self.checks.iter().map(|c| c.as_ref()).collect();
        // sort_by_key is stable
        ordered.sort_by_key(|c| c.order());
        ordered
    }
}
