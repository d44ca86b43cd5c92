//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use stevedore::builder::LicenseFormat;
use stevedore::core::profile::parse_key_value;

/// Stevedore - evaluate and build the dds-fmu package recipe
#[derive(Parser)]
#[command(name = "stevedore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub recipe: RecipeArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the recipe lives and how to configure it.
#[derive(Args, Debug, Clone, Default)]
pub struct RecipeArgs {
    /// Recipe root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub recipe_root: Option<PathBuf>,

    /// Profile file with settings, options and conf
    #[arg(long, global = true, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Override a setting, e.g. `-s compiler.version=11`
    #[arg(short = 's', long = "setting", global = true, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub settings: Vec<(String, String)>,

    /// Override an option, e.g. `-o with_doc=true`
    #[arg(short = 'o', long = "option", global = true, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,

    /// Skip building and running the test suite
    #[arg(long, global = true, value_name = "BOOL")]
    pub skip_test: Option<bool>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the resolved options
    Options,

    /// Print the requirement graph
    Graph(GraphArgs),

    /// Check the compiler against the recipe's requirements
    Validate,

    /// Write the toolchain, dependency wiring and license report
    Generate(GenerateArgs),

    /// Generate, then configure, build and test with CMake
    Build(BuildArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct GraphArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Resolved dependency set (JSON); empty when omitted
    #[arg(long, value_name = "FILE")]
    pub deps: Option<PathBuf>,

    /// Build folder (defaults to build/<build_type>)
    #[arg(long, value_name = "DIR")]
    pub build_folder: Option<PathBuf>,

    /// License report layout: table or list
    #[arg(long, value_name = "FORMAT")]
    pub license_format: Option<LicenseFormat>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub generate: GenerateArgs,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
