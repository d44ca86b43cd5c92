//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.stevedore/config.toml` - user-wide defaults
//! - Project: `<recipe_root>/.stevedore/config.toml` - recipe-specific overrides
//!
//! Project config takes precedence over global config. Profiles and the
//! command line take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::licenses::LicenseFormat;

/// Directory name used for both global and project config.
pub const CONFIG_DIR: &str = ".stevedore";

/// Stevedore configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Skip building and running tests (None = built-in default)
    pub skip_test: Option<bool>,

    /// Parallel jobs passed to the native build (None = build system default)
    pub jobs: Option<usize>,

    /// License report layout
    pub license_format: Option<LicenseFormat>,

    /// Build folder relative to the recipe root
    pub build_folder: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration, falling back to defaults if the file is missing
    /// or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.skip_test.is_some() {
            self.build.skip_test = other.build.skip_test;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.license_format.is_some() {
            self.build.license_format = other.build.license_format;
        }
        if other.build.build_folder.is_some() {
            self.build.build_folder = other.build.build_folder;
        }
    }
}

/// Load merged configuration from the global and project locations.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

/// `~/.stevedore`
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// `<recipe_root>/.stevedore/config.toml`
pub fn project_config_path(recipe_root: &Path) -> PathBuf {
    recipe_root.join(CONFIG_DIR).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[build]
skip_test = false
jobs = 8
license_format = "list"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.build.skip_test, Some(false));
        assert_eq!(config.build.jobs, Some(8));
        assert_eq!(config.build.license_format, Some(LicenseFormat::List));
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");
        std::fs::write(&global, "[build]\nskip_test = false\njobs = 4\n").unwrap();
        std::fs::write(&project, "[build]\nskip_test = true\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.build.skip_test, Some(true));
        assert_eq!(config.build.jobs, Some(4));
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[build\nskip_test = ").unwrap();

        let config = Config::load_or_default(&path);
        assert!(config.build.skip_test.is_none());
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &project_config_path(tmp.path()));
        assert!(config.build.skip_test.is_none());
        assert!(config.build.jobs.is_none());
    }
}
