//! The only fatal check: the runtime directory must accept writes.

use crate::context::HealthContext;
use crate::registry::{CheckOutcome, HealthCheck, HealthError};

pub struct RuntimeDirCheck;

impl HealthCheck for RuntimeDirCheck {
    fn name(&self) -> &str {
        "runtime_dir_writable"
    }

    fn order(&self) -> i32 {
        30
    }

    fn fatal(&self) -> bool {
        true
    }

    fn run(&self, ctx: &HealthContext) -> Result<CheckOutcome, HealthError> {
        let dir = &ctx.runtime_dir;
        if let Err(e) = std::fs::create_dir_all(dir) {
            return Ok(CheckOutcome::fail(format!("mkdir error: {e}")));
        }
        // Removed again on drop.
        if let Err(e) = tempfile::NamedTempFile::new_in(dir) {
            return Ok(CheckOutcome::fail(format!("cannot write temp file: {e}")));
        }
        Ok(CheckOutcome::ok(dir.display().to_string()))
    }
}
