//! Toolchain configuration for the native build system.
//!
//! A `ToolchainConfig` is the set of cache variables the CMake project
//! reads, plus the build-context packages whose CMake modules must be
//! loaded. It is rendered to two files in the generators folder:
//! `stevedore_toolchain.cmake` (passed as `CMAKE_TOOLCHAIN_FILE`) and
//! `stevedore_deps.cmake` (included by the former).

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use anyhow::Result;

use crate::builder::context::{BuildLayout, DEPS_FILE};
use crate::builder::deps::DependencyInfo;
use crate::core::options::ResolvedOptions;
use crate::core::package_id::PackageName;
use crate::core::settings::Settings;
use crate::resolver::requirements::{BUILD_HELPER, COMPLIANCE_CHECKER};
use crate::util::fs::{cmake_path, write_string};

const HEADER: &str = "# Generated by stevedore. Do not edit.\n";

/// A CMake cache value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    Bool(bool),
    String(String),
}

impl CacheValue {
    fn cache_type(&self) -> &'static str {
        match self {
            CacheValue::Bool(_) => "BOOL",
            CacheValue::String(_) => "STRING",
        }
    }
}

impl fmt::Display for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheValue::Bool(true) => f.write_str("ON"),
            CacheValue::Bool(false) => f.write_str("OFF"),
            CacheValue::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
        }
    }
}

/// Variables and activated build-context packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainConfig {
    variables: BTreeMap<String, CacheValue>,
    activated: Vec<PackageName>,
}

/// Prefix for recipe-specific variables: the name upper-cased with
/// everything but ASCII letters and digits dropped (`dds-fmu` -> `DDSFMU`).
pub fn variable_prefix(name: &PackageName) -> String {
    name.as_str()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

impl ToolchainConfig {
    /// Derive the configuration for one evaluation.
    pub fn new(
        name: &PackageName,
        options: &ResolvedOptions,
        settings: &Settings,
        with_tests: bool,
    ) -> Self {
        let prefix = variable_prefix(name);
        let mut config = ToolchainConfig::default();

        config.set(
            format!("{}_WITH_TOOLS", prefix),
            CacheValue::Bool(options.with_tools()),
        );
        config.set(
            format!("{}_WITH_DOC", prefix),
            CacheValue::Bool(options.with_doc()),
        );

        if let Some(fpic) = options.fpic() {
            config.set("CMAKE_POSITION_INDEPENDENT_CODE", CacheValue::Bool(fpic));
        }
        if let Some(cppstd) = settings.compiler.cppstd {
            config.set(
                "CMAKE_CXX_STANDARD",
                CacheValue::String(cppstd.as_number().to_string()),
            );
        }

        config.activate(PackageName::from_static(BUILD_HELPER.name));
        if with_tests {
            config.activate(PackageName::from_static(COMPLIANCE_CHECKER.name));
        }

        config
    }

    pub fn set(&mut self, key: impl Into<String>, value: CacheValue) {
        self.variables.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&CacheValue> {
        self.variables.get(key)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &CacheValue)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Mark a build-context package whose modules are loaded at configure time.
    pub fn activate(&mut self, name: PackageName) {
        if !self.activated.contains(&name) {
            self.activated.push(name);
        }
    }

    pub fn is_activated(&self, name: &str) -> bool {
        self.activated.iter().any(|n| n.as_str() == name)
    }

    pub fn activated(&self) -> &[PackageName] {
        &self.activated
    }

    /// Contents of `stevedore_toolchain.cmake`.
    pub fn render_toolchain(&self) -> String {
        let mut out = String::from(HEADER);
        for (key, value) in &self.variables {
            let _ = writeln!(
                out,
                "set({} {} CACHE {} \"\" FORCE)",
                key,
                value,
                value.cache_type()
            );
        }
        let _ = writeln!(
            out,
            "include(\"${{CMAKE_CURRENT_LIST_DIR}}/{}\" OPTIONAL)",
            DEPS_FILE
        );
        out
    }

    /// Contents of `stevedore_deps.cmake`.
    ///
    /// Host packages go on `CMAKE_PREFIX_PATH` for `find_package`.
    /// Activated build-context packages go on `CMAKE_MODULE_PATH` and have
    /// their build modules included.
    pub fn render_deps(&self, deps: &[DependencyInfo]) -> String {
        let mut out = String::from(HEADER);

        for dep in deps.iter().filter(|d| d.is_host()) {
            let _ = writeln!(
                out,
                "list(APPEND CMAKE_PREFIX_PATH \"{}\")",
                cmake_path(&dep.package_folder)
            );
        }

        for name in &self.activated {
            let Some(dep) = deps.iter().find(|d| &d.name == name) else {
                tracing::debug!("activated package `{}` is not in the dependency set", name);
                continue;
            };
            let _ = writeln!(
                out,
                "list(APPEND CMAKE_MODULE_PATH \"{}\")",
                cmake_path(&dep.package_folder)
            );
            for module in dep.build_module_paths() {
                let _ = writeln!(out, "include(\"{}\")", cmake_path(&module));
            }
        }

        out
    }

    /// Write both generator files.
    pub fn write(&self, layout: &BuildLayout, deps: &[DependencyInfo]) -> Result<()> {
        write_string(&layout.toolchain_file(), &self.render_toolchain())?;
        write_string(&layout.deps_file(), &self.render_deps(deps))?;
        tracing::debug!(
            "wrote toolchain to {}",
            layout.generators_folder().display()
        );
        Ok(())
    }
}
