//! `stevedore generate` command

use anyhow::Result;

use crate::cli::{GenerateArgs, RecipeArgs};
use stevedore::ops::generate;
use stevedore::util::GlobalContext;

pub fn execute(args: GenerateArgs, recipe: &RecipeArgs, gctx: &GlobalContext) -> Result<()> {
    let eval = super::evaluate(recipe, gctx)?;
    eval.validate()?;

    let opts = super::generate_options(&args, gctx)?;
    let report = generate(&eval, &opts)?;

    eprintln!(
        "    Generated {} in {}",
        eval.recipe.reference(),
        report.layout.build_folder().display()
    );
    eprintln!("     Toolchain {}", report.layout.toolchain_file().display());
    eprintln!(
        "      Licenses {} entries",
        report.licenses.entry_count()
    );
    if let Some(seed) = &report.shim_seed {
        eprintln!("          Shim {}", seed.display());
    }
    Ok(())
}
