//! Command implementations

pub mod build;
pub mod completions;
pub mod generate;
pub mod graph;
pub mod options;
pub mod validate;

use anyhow::Result;

use crate::cli::{GenerateArgs, RecipeArgs};
use stevedore::builder::load_deps;
use stevedore::ops::{self, EvaluateOptions, Evaluation, GenerateOptions};
use stevedore::util::GlobalContext;

/// Evaluate the recipe selected by the global flags.
pub fn evaluate(recipe: &RecipeArgs, gctx: &GlobalContext) -> Result<Evaluation> {
    let opts = EvaluateOptions {
        recipe_root: recipe.recipe_root.clone(),
        profile: recipe.profile.clone(),
        settings: recipe.settings.clone(),
        options: recipe.options.clone(),
        skip_test: recipe.skip_test,
    };
    ops::evaluate(gctx, &opts)
}

pub fn generate_options(args: &GenerateArgs, gctx: &GlobalContext) -> Result<GenerateOptions> {
    let deps = match &args.deps {
        Some(path) => load_deps(&gctx.resolve_path(path))?,
        None => Vec::new(),
    };
    Ok(GenerateOptions {
        deps,
        build_folder: args.build_folder.as_ref().map(|p| gctx.resolve_path(p)),
        license_format: args.license_format,
    })
}
