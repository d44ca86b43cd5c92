//! Expose a directory for test reports.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::hooks::{prepare_destination, Hook, HookContext};

pub const TEST_RESULTS_HOOK: &str = "test-results";

const DESTINATION_DIR: &str = "testoutput";

/// Creates `testoutput/` so the test phase can write reports there.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestResultsHook;

impl Hook for TestResultsHook {
    fn id(&self) -> &'static str {
        TEST_RESULTS_HOOK
    }

    fn pre_build(&self, ctx: &HookContext) -> Result<Option<PathBuf>> {
        let destination = ctx.ci_directory(DESTINATION_DIR);
        prepare_destination(TEST_RESULTS_HOOK, &destination)?;
        info!("test results will be written to {}", destination.display());
        Ok(Some(destination))
    }

    fn post_build(&self, _ctx: &HookContext, _destination: &Path) -> Result<()> {
        Ok(())
    }
}
