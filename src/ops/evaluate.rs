//! Recipe evaluation: settings, options and the requirement graph.
//!
//! Every command starts here. Evaluation loads the recipe, merges the
//! profile with command-line overrides, fills missing settings from the
//! host and derives the option set and requirement graph. Compatibility
//! validation is a separate step so that `options` and `graph` work for
//! configurations the recipe would refuse to build.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::manifest::Recipe;
use crate::core::options::{resolve_options, OptionSchema, ResolvedOptions};
use crate::core::profile::Profile;
use crate::core::settings::{detect_host_compiler, CompilerSettings, Settings};
use crate::resolver::compat::{self, Compatibility};
use crate::resolver::requirements::{requirements, RequirementGraph};
use crate::util::config::Config;
use crate::util::context::GlobalContext;

/// Tests are skipped unless something says otherwise.
pub const DEFAULT_SKIP_TEST: bool = true;

/// Inputs gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct EvaluateOptions {
    /// Recipe root (None = current directory)
    pub recipe_root: Option<PathBuf>,

    /// Profile file to start from
    pub profile: Option<PathBuf>,

    /// `-s key=value` overrides
    pub settings: Vec<(String, String)>,

    /// `-o key=value` overrides
    pub options: Vec<(String, String)>,

    /// `--skip-test` from the command line
    pub skip_test: Option<bool>,
}

/// Everything derived from one recipe and configuration.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub recipe: Recipe,
    pub settings: Settings,
    pub options: ResolvedOptions,
    pub with_tests: bool,
    pub graph: RequirementGraph,
    pub config: Config,
}

impl Evaluation {
    /// Check the compiler against the recipe's C++17 requirement.
    pub fn validate(&self) -> Result<Compatibility> {
        let compatibility = compat::validate(&self.recipe.reference(), &self.settings.compiler)?;
        Ok(compatibility)
    }
}

/// Evaluate the recipe selected by `opts`.
pub fn evaluate(gctx: &GlobalContext, opts: &EvaluateOptions) -> Result<Evaluation> {
    let root = match &opts.recipe_root {
        Some(root) => gctx.resolve_path(root),
        None => gctx.cwd().to_path_buf(),
    };
    let recipe = Recipe::load(&root)?;

    let mut profile = match &opts.profile {
        Some(path) => Profile::load(&gctx.resolve_path(path))?,
        None => Profile::default(),
    };
    for (key, value) in &opts.settings {
        profile.set_setting(key, value)?;
    }
    for (key, value) in &opts.options {
        profile.set_option(key, value)?;
    }

    let config = gctx.config_for(recipe.root());
    evaluate_with(recipe, &profile, config, opts.skip_test, detect_host_compiler)
}

/// Evaluate with every input already loaded.
pub fn evaluate_with(
    recipe: Recipe,
    profile: &Profile,
    config: Config,
    skip_test_cli: Option<bool>,
    detect_compiler: impl FnOnce() -> Option<CompilerSettings>,
) -> Result<Evaluation> {
    let settings = profile
        .resolve_settings(detect_compiler)
        .context("invalid settings")?;

    let schema = OptionSchema::dds_fmu();
    let mut options = resolve_options(&schema, &settings);
    options.apply_overrides(&schema, &profile.option_overrides())?;

    let skip_test = skip_test_flag(skip_test_cli, profile.conf.skip_test, config.build.skip_test);
    let with_tests = !skip_test;
    let graph = requirements(&options, with_tests, &settings);

    tracing::debug!(
        "evaluated {} for {} {} {} ({} requirements)",
        recipe.reference(),
        settings.os,
        settings.compiler.family,
        settings.compiler.version,
        graph.len()
    );

    Ok(Evaluation {
        recipe,
        settings,
        options,
        with_tests,
        graph,
        config,
    })
}

/// First explicit value wins: command line, profile, config files.
pub fn skip_test_flag(cli: Option<bool>, profile: Option<bool>, config: Option<bool>) -> bool {
    cli.or(profile).or(config).unwrap_or(DEFAULT_SKIP_TEST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::RecipeError;
    use crate::core::options::FPIC;
    use crate::test_support::write_recipe_root;
    use crate::util::diagnostic::recipe_error;
    use tempfile::TempDir;

    fn gcc_profile(os: &str, version: &str) -> Profile {
        let mut profile = Profile::default();
        profile.set_setting("os", os).unwrap();
        profile.set_setting("compiler", "gcc").unwrap();
        profile.set_setting("compiler.version", version).unwrap();
        profile
    }

    fn recipe(tmp: &TempDir) -> Recipe {
        write_recipe_root(tmp.path(), "dds-fmu", "0.3.0\n");
        Recipe::load(tmp.path()).unwrap()
    }

    fn no_detection() -> Option<CompilerSettings> {
        None
    }

    #[test]
    fn test_skip_test_precedence() {
        assert!(skip_test_flag(None, None, None));
        assert!(!skip_test_flag(None, None, Some(false)));
        assert!(skip_test_flag(None, Some(true), Some(false)));
        assert!(!skip_test_flag(Some(false), Some(true), Some(true)));
    }

    #[test]
    fn test_default_evaluation_skips_tests() {
        let tmp = TempDir::new().unwrap();
        let eval = evaluate_with(
            recipe(&tmp),
            &gcc_profile("Linux", "11.2"),
            Config::default(),
            None,
            no_detection,
        )
        .unwrap();

        assert!(!eval.with_tests);
        assert!(!eval.graph.contains("gtest"));
        assert_eq!(eval.options.fpic(), Some(true));
        assert!(eval.validate().unwrap().is_verified());
    }

    #[test]
    fn test_config_enables_tests() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.build.skip_test = Some(false);

        let eval = evaluate_with(
            recipe(&tmp),
            &gcc_profile("Linux", "11.2"),
            config,
            None,
            no_detection,
        )
        .unwrap();
        assert!(eval.with_tests);
        assert!(eval.graph.contains("fmu-compliance-checker"));
    }

    #[test]
    fn test_windows_drops_fpic_override() {
        let tmp = TempDir::new().unwrap();
        let mut profile = gcc_profile("Windows", "11.2");
        profile.set_option(FPIC, "false").unwrap();
        profile.set_option("with_doc", "true").unwrap();

        let eval = evaluate_with(recipe(&tmp), &profile, Config::default(), None, no_detection).unwrap();
        assert!(!eval.options.contains(FPIC));
        assert!(eval.graph.contains("strawberryperl"));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut profile = gcc_profile("Linux", "11.2");
        profile.set_option("shared", "true").unwrap();

        let err = evaluate_with(recipe(&tmp), &profile, Config::default(), None, no_detection).unwrap_err();
        assert!(matches!(recipe_error(&err), Some(RecipeError::InvalidOption { .. })));
    }

    #[test]
    fn test_old_compiler_fails_validation() {
        let tmp = TempDir::new().unwrap();
        let eval = evaluate_with(
            recipe(&tmp),
            &gcc_profile("Linux", "7.0"),
            Config::default(),
            None,
            no_detection,
        )
        .unwrap();

        let err = eval.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("C++17"));
    }

    #[test]
    fn test_missing_compiler_is_reported() {
        let tmp = TempDir::new().unwrap();
        let err = evaluate_with(recipe(&tmp), &Profile::default(), Config::default(), None, no_detection)
            .unwrap_err();
        assert!(matches!(recipe_error(&err), Some(RecipeError::InvalidSetting { .. })));
    }

    #[test]
    fn test_evaluate_reads_recipe_root_and_overrides() {
        let tmp = TempDir::new().unwrap();
        write_recipe_root(tmp.path(), "dds-fmu", "0.3.0");
        let gctx = GlobalContext::with_paths(tmp.path(), tmp.path().join("home"));
        let opts = EvaluateOptions {
            recipe_root: Some(PathBuf::from(".")),
            settings: vec![
                ("os".into(), "Linux".into()),
                ("compiler".into(), "clang".into()),
                ("compiler.version".into(), "15".into()),
            ],
            options: vec![("with_tools".into(), "false".into())],
            skip_test: Some(false),
            ..Default::default()
        };

        let eval = evaluate(&gctx, &opts).unwrap();
        assert_eq!(eval.recipe.identity().version(), "0.3.0");
        assert!(!eval.graph.contains("kuba-zip"));
        assert!(eval.graph.contains("gtest"));
    }
}
