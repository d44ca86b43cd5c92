//! Stevedore CLI - evaluate and build the dds-fmu recipe

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stevedore::util::diagnostic::emit_error;
use stevedore::util::GlobalContext;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        emit_error(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let default_filter = if cli.verbose {
        "stevedore=debug"
    } else {
        "stevedore=info"
    };
    let filter =
        EnvFilter::try_from_env("STEVEDORE_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut gctx = GlobalContext::new()?;
    gctx.set_verbose(cli.verbose);
    gctx.set_color(!cli.no_color);

    match cli.command {
        Commands::Options => commands::options::execute(&cli.recipe, &gctx),
        Commands::Graph(args) => commands::graph::execute(args, &cli.recipe, &gctx),
        Commands::Validate => commands::validate::execute(&cli.recipe, &gctx),
        Commands::Generate(args) => commands::generate::execute(args, &cli.recipe, &gctx),
        Commands::Build(args) => commands::build::execute(args, &cli.recipe, &gctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
