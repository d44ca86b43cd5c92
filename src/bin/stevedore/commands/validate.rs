//! `stevedore validate` command

use anyhow::Result;

use crate::cli::RecipeArgs;
use stevedore::resolver::Compatibility;
use stevedore::util::GlobalContext;

pub fn execute(recipe: &RecipeArgs, gctx: &GlobalContext) -> Result<()> {
    let eval = super::evaluate(recipe, gctx)?;
    let compiler = &eval.settings.compiler;

    let compatibility = eval.validate()?;
    if let Some(warning) = compatibility.warning(&eval.recipe.reference(), gctx.is_verbose()) {
        eprint!("{}", warning.format(gctx.color()));
    }

    match compatibility {
        Compatibility::Verified => println!(
            "{} is compatible with {} {}",
            eval.recipe.reference(),
            compiler.family,
            compiler.version
        ),
        Compatibility::Unverified { family } => println!(
            "{}: compiler `{}` was not checked",
            eval.recipe.reference(),
            family
        ),
    }
    Ok(())
}
