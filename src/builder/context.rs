//! Build folder layout.
//!
//! Everything stevedore writes lives under one build folder, by default
//! `<recipe_root>/build/<BuildType>`:
//!
//! ```text
//! <build>/generators/stevedore_toolchain.cmake
//! <build>/generators/stevedore_deps.cmake
//! <build>/licenses/...
//! <build>/gen_md/licenses.md
//! <build>/cppfmu/fmi_functions.cpp
//! <build>/package/            (install prefix)
//! ```

use std::path::{Path, PathBuf};

use crate::core::settings::BuildType;

pub const TOOLCHAIN_FILE: &str = "stevedore_toolchain.cmake";
pub const DEPS_FILE: &str = "stevedore_deps.cmake";

/// Paths derived from the recipe root and the build folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    recipe_root: PathBuf,
    build_folder: PathBuf,
}

impl BuildLayout {
    /// `<recipe_root>/build/<build_type>`
    pub fn new(recipe_root: impl Into<PathBuf>, build_type: BuildType) -> Self {
        let recipe_root = recipe_root.into();
        let build_folder = recipe_root.join("build").join(build_type.as_str());
        BuildLayout {
            recipe_root,
            build_folder,
        }
    }

    /// Use an explicit build folder. Relative paths are taken from the
    /// recipe root.
    pub fn with_build_folder(mut self, build_folder: impl AsRef<Path>) -> Self {
        let build_folder = build_folder.as_ref();
        self.build_folder = if build_folder.is_absolute() {
            build_folder.to_path_buf()
        } else {
            self.recipe_root.join(build_folder)
        };
        self
    }

    pub fn recipe_root(&self) -> &Path {
        &self.recipe_root
    }

    pub fn build_folder(&self) -> &Path {
        &self.build_folder
    }

    pub fn generators_folder(&self) -> PathBuf {
        self.build_folder.join("generators")
    }

    pub fn toolchain_file(&self) -> PathBuf {
        self.generators_folder().join(TOOLCHAIN_FILE)
    }

    pub fn deps_file(&self) -> PathBuf {
        self.generators_folder().join(DEPS_FILE)
    }

    pub fn licenses_folder(&self) -> PathBuf {
        self.build_folder.join("licenses")
    }

    pub fn gen_md_folder(&self) -> PathBuf {
        self.build_folder.join("gen_md")
    }

    pub fn install_prefix(&self) -> PathBuf {
        self.build_folder.join("package")
    }
}
