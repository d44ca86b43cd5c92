//! Implementation of `stevedore build`.

use anyhow::{bail, Result};

use crate::builder::backend::BuildSystem;
use crate::builder::cmake::CMakeBuildSystem;
use crate::hooks::test_results::TEST_RESULTS_HOOK;
use crate::hooks::{HookContext, HookRegistry};
use crate::ops::evaluate::Evaluation;
use crate::ops::generate::{build_layout, generate, GenerateOptions, GenerateReport};
use crate::ops::lifecycle::{Pipeline, PipelineReport};
use crate::resolver::compat::Compatibility;

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub generate: GenerateOptions,

    /// Number of parallel jobs (None = config, then the build system's default)
    pub jobs: Option<usize>,
}

/// Result of a completed build.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub compatibility: Compatibility,
    pub generated: GenerateReport,
    pub pipeline: PipelineReport,
}

/// Validate, generate and build with CMake and the default hooks.
pub fn build(eval: &Evaluation, opts: &BuildOptions) -> Result<BuildOutcome> {
    let compatibility = eval.validate()?;

    let layout = build_layout(eval, opts.generate.build_folder.as_deref());
    let jobs = opts.jobs.or(eval.config.build.jobs);
    let cmake = CMakeBuildSystem::new(layout, eval.settings.build_type)?.jobs(jobs);
    let availability = cmake.availability();
    if let Some(message) = availability.error_message() {
        bail!("cannot use cmake: {}", message);
    }

    execute(eval, opts, &HookRegistry::with_defaults(), &cmake, compatibility)
}

/// Validate, generate and build with an explicit backend and hook set.
pub fn build_with(
    eval: &Evaluation,
    opts: &BuildOptions,
    hooks: &HookRegistry,
    backend: &dyn BuildSystem,
) -> Result<BuildOutcome> {
    let compatibility = eval.validate()?;
    execute(eval, opts, hooks, backend, compatibility)
}

fn execute(
    eval: &Evaluation,
    opts: &BuildOptions,
    hooks: &HookRegistry,
    backend: &dyn BuildSystem,
    compatibility: Compatibility,
) -> Result<BuildOutcome> {
    let generated = generate(eval, &opts.generate)?;

    let mut hook_ctx = HookContext::new(
        eval.recipe.identity().clone(),
        eval.recipe.root(),
        generated.layout.build_folder(),
    );
    hooks.dispatch_pre_build(&mut hook_ctx)?;

    let pipeline = Pipeline::plan(eval.options.with_doc(), eval.with_tests);
    let report = pipeline.run(backend, hook_ctx.destination(TEST_RESULTS_HOOK))?;

    hooks.dispatch_post_build(&hook_ctx)?;

    tracing::info!(
        "built {} ({} phases)",
        eval.recipe.reference(),
        report.completed.len()
    );

    Ok(BuildOutcome {
        compatibility,
        generated,
        pipeline: report,
    })
}
