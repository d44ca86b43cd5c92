//! `stevedore build` command

use anyhow::Result;

use crate::cli::{BuildArgs, RecipeArgs};
use stevedore::ops::{build, BuildOptions};
use stevedore::util::GlobalContext;

pub fn execute(args: BuildArgs, recipe: &RecipeArgs, gctx: &GlobalContext) -> Result<()> {
    let eval = super::evaluate(recipe, gctx)?;

    let opts = BuildOptions {
        generate: super::generate_options(&args.generate, gctx)?,
        jobs: args.jobs,
    };
    let outcome = build(&eval, &opts)?;

    let phases: Vec<_> = outcome
        .pipeline
        .completed
        .iter()
        .map(|p| p.as_str())
        .collect();
    eprintln!(
        "    Finished {} ({})",
        eval.recipe.reference(),
        phases.join(", ")
    );
    Ok(())
}
