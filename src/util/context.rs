//! Global context for Stevedore operations.
//!
//! Holds the working directory, the user-level config home and the output
//! preferences set on the command line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_dir, load_config, project_config_path, Config, CONFIG_DIR};

/// Global context containing configuration paths and output preferences.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for user-level data (`~/.stevedore/`)
    home: PathBuf,

    verbose: bool,
    color: bool,
}

impl GlobalContext {
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = global_config_dir().unwrap_or_else(|| PathBuf::from(CONFIG_DIR));

        Ok(GlobalContext {
            cwd,
            home,
            verbose: false,
            color: true,
        })
    }

    /// Create a context with explicit paths, bypassing host detection.
    pub fn with_paths(cwd: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        GlobalContext {
            cwd: cwd.into(),
            home: home.into(),
            verbose: false,
            color: false,
        }
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// `~/.stevedore/config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Resolve a possibly relative path against the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Global config merged with the recipe's project config.
    pub fn config_for(&self, recipe_root: &Path) -> Config {
        load_config(Some(&self.config_path()), &project_config_path(recipe_root))
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }
}
