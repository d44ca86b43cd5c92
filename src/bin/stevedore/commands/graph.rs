//! `stevedore graph` command

use anyhow::Result;

use crate::cli::{GraphArgs, RecipeArgs};
use stevedore::util::GlobalContext;

pub fn execute(args: GraphArgs, recipe: &RecipeArgs, gctx: &GlobalContext) -> Result<()> {
    let eval = super::evaluate(recipe, gctx)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&eval.graph)?);
    } else {
        print!("{}", eval.graph);
    }
    Ok(())
}
