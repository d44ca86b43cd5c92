//! The build pipeline.
//!
//! Phases run strictly in order and the first failure stops the pipeline.
//! Nothing is retried and completed phases are not undone.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::builder::backend::BuildSystem;
use crate::core::errors::RecipeError;
use crate::util::env::EnvOverride;
use crate::util::fs::cmake_path;

/// Target and install component of the documentation build.
pub const DOC_TARGET: &str = "doc";

/// A pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Configure,
    Documentation,
    Build,
    Test,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Configure => "configure",
            Phase::Documentation => "documentation",
            Phase::Build => "build",
            Phase::Test => "test",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The phases that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub completed: Vec<Phase>,
}

/// An ordered list of phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    phases: Vec<Phase>,
}

impl Pipeline {
    /// Configure, then documentation if requested, then build, then tests
    /// if requested.
    pub fn plan(with_doc: bool, with_tests: bool) -> Self {
        let mut phases = vec![Phase::Configure];
        if with_doc {
            phases.push(Phase::Documentation);
        }
        phases.push(Phase::Build);
        if with_tests {
            phases.push(Phase::Test);
        }
        Pipeline { phases }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Run every phase against `backend`.
    ///
    /// `test_results` is the directory test reports should be written to,
    /// if one was prepared.
    pub fn run(&self, backend: &dyn BuildSystem, test_results: Option<&Path>) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        for &phase in &self.phases {
            tracing::info!("{}: {}", backend.name(), phase);
            run_phase(phase, backend, test_results).map_err(|e| RecipeError::ExternalBuildFailure {
                phase: phase.to_string(),
                message: format!("{:#}", e),
            })?;
            report.completed.push(phase);
        }

        Ok(report)
    }
}

fn run_phase(phase: Phase, backend: &dyn BuildSystem, test_results: Option<&Path>) -> Result<()> {
    match phase {
        Phase::Configure => backend.configure(),
        Phase::Documentation => {
            backend.build(Some(DOC_TARGET))?;
            backend.install(Some(DOC_TARGET))
        }
        Phase::Build => backend.build(None),
        Phase::Test => {
            let _env = EnvOverride::apply(&test_environment(test_results));
            backend.test()
        }
    }
}

/// Variables set for the duration of the test phase.
pub fn test_environment(test_results: Option<&Path>) -> BTreeMap<String, Option<String>> {
    let mut env = BTreeMap::new();
    env.insert("CTEST_OUTPUT_ON_FAILURE".to_string(), Some("ON".to_string()));
    if let Some(dir) = test_results {
        env.insert(
            "GTEST_OUTPUT".to_string(),
            Some(format!("xml:{}/", cmake_path(dir))),
        );
    }
    env
}
