//! Recipe.toml manifest parsing and the version sidecar.
//!
//! The manifest carries everything about the package except its version,
//! which lives in `version.txt` so CI can bump it without touching the
//! recipe. Both are read once when the recipe is loaded.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::errors::RecipeError;
use crate::core::package_id::{PackageName, PackageRef};

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Recipe.toml";

/// Sidecar file holding the package version.
pub const VERSION_FILE: &str = "version.txt";

/// What kind of artifact the package produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PackageType {
    Application,
    Library,
    #[default]
    SharedLibrary,
    StaticLibrary,
    HeaderLibrary,
    BuildScripts,
}

impl PackageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Application => "application",
            PackageType::Library => "library",
            PackageType::SharedLibrary => "shared-library",
            PackageType::StaticLibrary => "static-library",
            PackageType::HeaderLibrary => "header-library",
            PackageType::BuildScripts => "build-scripts",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Package metadata from the `[package]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Package name
    pub name: PackageName,

    /// Author or maintainer
    pub author: String,

    /// Package description
    #[serde(default)]
    pub description: Option<String>,

    /// SPDX license identifier
    pub license: String,

    /// Project homepage
    pub homepage: Url,

    /// Topic tags for discovery
    #[serde(default)]
    pub topics: Vec<String>,

    /// Artifact kind
    #[serde(default)]
    pub package_type: PackageType,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    package: PackageMetadata,
}

/// Identity of the package a recipe builds.
///
/// Immutable once constructed; fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    name: PackageName,
    version: String,
    author: String,
    description: Option<String>,
    license: String,
    homepage: Url,
    topics: Vec<String>,
    package_type: PackageType,
}

impl PackageIdentity {
    /// Combine manifest metadata with a version.
    pub fn new(metadata: PackageMetadata, version: impl Into<String>) -> Self {
        PackageIdentity {
            name: metadata.name,
            version: version.into(),
            author: metadata.author,
            description: metadata.description,
            license: metadata.license,
            homepage: metadata.homepage,
            topics: metadata.topics,
            package_type: metadata.package_type,
        }
    }

    pub fn name(&self) -> &PackageName {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn license(&self) -> &str {
        &self.license
    }

    pub fn homepage(&self) -> &Url {
        &self.homepage
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn package_type(&self) -> PackageType {
        self.package_type
    }

    /// The `name/version` reference used in messages and by hooks.
    pub fn reference(&self) -> PackageRef {
        PackageRef::new(self.name.clone(), self.version.clone())
    }
}

/// A loaded recipe: its identity plus where it lives on disk.
#[derive(Debug, Clone)]
pub struct Recipe {
    identity: PackageIdentity,
    root: PathBuf,
}

impl Recipe {
    /// Load `Recipe.toml` and `version.txt` from a recipe root.
    pub fn load(root: &Path) -> Result<Self> {
        let manifest_path = root.join(MANIFEST_NAME);
        let contents = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("failed to read manifest: {}", manifest_path.display()))?;
        let raw: RawManifest = toml::from_str(&contents)
            .with_context(|| format!("failed to parse manifest: {}", manifest_path.display()))?;

        let version = read_version(root)?;
        tracing::debug!("loaded recipe {}/{}", raw.package.name, version);

        Ok(Recipe {
            identity: PackageIdentity::new(raw.package, version),
            root: root.to_path_buf(),
        })
    }

    /// Construct a recipe from an already-built identity.
    pub fn from_identity(identity: PackageIdentity, root: impl Into<PathBuf>) -> Self {
        Recipe {
            identity,
            root: root.into(),
        }
    }

    pub fn identity(&self) -> &PackageIdentity {
        &self.identity
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn reference(&self) -> PackageRef {
        self.identity.reference()
    }
}

/// Read the version sidecar, trimmed.
pub fn read_version(root: &Path) -> Result<String, RecipeError> {
    let path = root.join(VERSION_FILE);
    let raw = std::fs::read_to_string(&path).map_err(|e| RecipeError::MissingVersionSource {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let version = raw.trim();
    if version.is_empty() {
        return Err(RecipeError::MissingVersionSource {
            path,
            reason: "file is empty".to_string(),
        });
    }
    Ok(version.to_string())
}
