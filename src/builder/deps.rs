//! Externally resolved dependencies.
//!
//! The package manager that fetched the requirement graph describes what it
//! installed in a JSON array:
//!
//! ```json
//! [{"name": "fast-dds", "version": "2.11.2", "role": "host",
//!   "license": "Apache-2.0", "package_folder": "/p/fast-dds",
//!   "src_dirs": [], "build_modules": []}]
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::package_id::PackageName;
use crate::resolver::requirements::Role;

/// A license declaration: one identifier or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum License {
    Single(String),
    Multiple(Vec<String>),
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            License::Single(id) => f.write_str(id),
            License::Multiple(ids) => f.write_str(&ids.join(", ")),
        }
    }
}

impl From<&str> for License {
    fn from(id: &str) -> Self {
        License::Single(id.to_string())
    }
}

/// One installed dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyInfo {
    pub name: PackageName,

    #[serde(default)]
    pub version: Option<String>,

    pub role: Role,

    pub license: License,

    /// Install root of the package
    pub package_folder: PathBuf,

    /// Source directories the package exports, if any
    #[serde(default)]
    pub src_dirs: Vec<PathBuf>,

    /// CMake modules to `include()` when the package is activated.
    /// Relative paths are resolved against `package_folder`.
    #[serde(default)]
    pub build_modules: Vec<PathBuf>,
}

impl DependencyInfo {
    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    /// Build modules as absolute paths.
    pub fn build_module_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.build_modules.iter().map(|module| {
            if module.is_absolute() {
                module.clone()
            } else {
                self.package_folder.join(module)
            }
        })
    }
}

/// Load a `deps.json` dependency set.
pub fn load_deps(path: &Path) -> Result<Vec<DependencyInfo>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dependency set: {}", path.display()))?;

    let deps: Vec<DependencyInfo> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse dependency set: {}", path.display()))?;

    tracing::debug!("loaded {} dependencies from {}", deps.len(), path.display());
    Ok(deps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_single_and_multiple_licenses() {
        let json = r#"[
            {"name": "fast-dds", "version": "2.11.2", "role": "host",
             "license": "Apache-2.0", "package_folder": "/p/fast-dds"},
            {"name": "kuba-zip", "role": "host",
             "license": ["Unlicense", "MIT"], "package_folder": "/p/zip"},
            {"name": "cmake", "role": "build-tool",
             "license": "BSD-3-Clause", "package_folder": "/p/cmake"}
        ]"#;

        let deps: Vec<DependencyInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(deps[0].license.to_string(), "Apache-2.0");
        assert_eq!(deps[1].license.to_string(), "Unlicense, MIT");
        assert!(deps[1].version.is_none());
        assert!(deps[1].src_dirs.is_empty());
        assert!(!deps[2].is_host());
    }

    #[test]
    fn test_build_modules_resolve_against_package_folder() {
        let dep = DependencyInfo {
            name: "fmu-build-helper".parse().unwrap(),
            version: Some("1.0.0".to_string()),
            role: Role::BuildTool,
            license: "MPL-2.0".into(),
            package_folder: PathBuf::from("/p/helper"),
            src_dirs: Vec::new(),
            build_modules: vec![PathBuf::from("cmake/FmuBuildHelper.cmake")],
        };

        let modules: Vec<_> = dep.build_module_paths().collect();
        assert_eq!(modules, vec![PathBuf::from("/p/helper/cmake/FmuBuildHelper.cmake")]);
    }

    #[test]
    fn test_load_deps_reports_path_on_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deps.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_deps(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("deps.json"));

        let err = load_deps(&tmp.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read dependency set"));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let json = r#"[{"name": "Fast DDS", "role": "host", "license": "MIT",
                        "package_folder": "/p"}]"#;
        assert!(serde_json::from_str::<Vec<DependencyInfo>>(json).is_err());
    }
}
