//! `stevedore options` command

use anyhow::Result;

use crate::cli::RecipeArgs;
use stevedore::util::GlobalContext;

pub fn execute(recipe: &RecipeArgs, gctx: &GlobalContext) -> Result<()> {
    let eval = super::evaluate(recipe, gctx)?;

    print!("{}", eval.options);
    println!("with_tests={}", eval.with_tests);
    Ok(())
}
