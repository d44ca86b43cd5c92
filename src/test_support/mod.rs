//! Test utilities and mocks for Stevedore unit tests.
//!
//! Fixtures build settings, identities and dependency records without
//! touching the host, and `MockBuildSystem` stands in for CMake so the
//! lifecycle can be exercised without a native toolchain.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::builder::backend::BuildSystem;
use crate::builder::deps::{DependencyInfo, License};
use crate::core::manifest::{PackageIdentity, PackageMetadata, PackageType, MANIFEST_NAME, VERSION_FILE};
use crate::core::package_id::PackageName;
use crate::core::settings::{
    Arch, BuildType, CompilerFamily, CompilerSettings, CompilerVersion, Os, Settings,
};
use crate::resolver::requirements::Role;

/// Release settings for `os` with a compiler that passes validation:
/// MSVC on Windows, GCC 11 everywhere else. No explicit cppstd.
pub fn settings_for(os: &str) -> Settings {
    let os: Os = os.parse().unwrap();
    let compiler = if os == Os::Windows {
        CompilerSettings {
            family: CompilerFamily::Msvc,
            version: CompilerVersion::from_parts(19, 3),
            cppstd: None,
        }
    } else {
        CompilerSettings {
            family: CompilerFamily::Gcc,
            version: CompilerVersion::from_parts(11, 0),
            cppstd: None,
        }
    };

    Settings {
        os,
        arch: Arch::X86_64,
        compiler,
        build_type: BuildType::Release,
    }
}

fn metadata(name: &str) -> PackageMetadata {
    PackageMetadata {
        name: name.parse().unwrap(),
        author: "SINTEF Digital".to_string(),
        description: Some("FMU wrapper for DDS".to_string()),
        license: "MPL-2.0".to_string(),
        homepage: "https://github.com/SINTEF/dds-fmu".parse().unwrap(),
        topics: vec!["fmi".to_string(), "dds".to_string()],
        package_type: PackageType::SharedLibrary,
    }
}

/// An MPL-2.0 identity.
pub fn identity(name: &str, version: &str) -> PackageIdentity {
    PackageIdentity::new(metadata(name), version)
}

/// Write `Recipe.toml`, `version.txt` (verbatim) and a stub
/// `CMakeLists.txt` into `root`.
pub fn write_recipe_root(root: &Path, name: &str, version_contents: &str) {
    std::fs::create_dir_all(root).unwrap();
    let manifest = format!(
        r#"[package]
name = "{}"
author = "SINTEF Digital"
description = "FMU wrapper for DDS"
license = "MPL-2.0"
homepage = "https://github.com/SINTEF/dds-fmu"
topics = ["fmi", "dds"]
package_type = "shared-library"
"#,
        name
    );
    std::fs::write(root.join(MANIFEST_NAME), manifest).unwrap();
    std::fs::write(root.join(VERSION_FILE), version_contents).unwrap();
    std::fs::write(
        root.join("CMakeLists.txt"),
        format!("cmake_minimum_required(VERSION 3.18)\nproject({})\n", name),
    )
    .unwrap();
}

/// A dependency record with a single license and no sources or modules.
pub fn dependency(name: &str, role: Role, license: &str, folder: &str) -> DependencyInfo {
    DependencyInfo {
        name: PackageName::new(name).unwrap(),
        version: None,
        role,
        license: License::from(license),
        package_folder: PathBuf::from(folder),
        src_dirs: Vec::new(),
        build_modules: Vec::new(),
    }
}

/// A build system that records calls instead of running anything.
///
/// Calls are recorded as `configure`, `build`, `build:<target>`,
/// `install`, `install:<component>` and `test`. The variables the test
/// phase reads are captured while `test()` runs.
#[derive(Debug, Default)]
pub struct MockBuildSystem {
    calls: Mutex<Vec<String>>,
    fail_on: Option<String>,
    test_env: Mutex<BTreeMap<String, Option<String>>>,
}

const OBSERVED_VARS: &[&str] = &["CTEST_OUTPUT_ON_FAILURE", "GTEST_OUTPUT"];

impl MockBuildSystem {
    pub fn new() -> Self {
        MockBuildSystem::default()
    }

    /// Fail the first call recorded as `call`.
    pub fn failing_on(call: &str) -> Self {
        MockBuildSystem {
            fail_on: Some(call.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Value of `key` as seen during `test()`.
    pub fn test_env(&self, key: &str) -> Option<String> {
        self.test_env.lock().unwrap().get(key).cloned().flatten()
    }

    fn record(&self, call: String) -> Result<()> {
        let fail = self.fail_on.as_deref() == Some(call.as_str());
        self.calls.lock().unwrap().push(call.clone());
        if fail {
            bail!("{} exited with status 2", call);
        }
        Ok(())
    }
}

impl BuildSystem for MockBuildSystem {
    fn name(&self) -> &str {
        "mock"
    }

    fn configure(&self) -> Result<()> {
        self.record("configure".to_string())
    }

    fn build(&self, target: Option<&str>) -> Result<()> {
        match target {
            Some(target) => self.record(format!("build:{}", target)),
            None => self.record("build".to_string()),
        }
    }

    fn install(&self, component: Option<&str>) -> Result<()> {
        match component {
            Some(component) => self.record(format!("install:{}", component)),
            None => self.record("install".to_string()),
        }
    }

    fn test(&self) -> Result<()> {
        {
            let mut env = self.test_env.lock().unwrap();
            for key in OBSERVED_VARS {
                env.insert(key.to_string(), std::env::var(key).ok());
            }
        }
        self.record("test".to_string())
    }
}
