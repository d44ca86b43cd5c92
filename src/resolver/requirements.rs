//! The conditional requirement graph.
//!
//! `requirements` is the whole dependency declaration in one pure function:
//! given resolved options, the tests flag and settings it returns every
//! pinned reference with its role. Nothing is fetched here; the graph is an
//! instruction set for whatever resolver consumes it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::options::ResolvedOptions;
use crate::core::package_id::{PackageName, PackageRef};
use crate::core::settings::Settings;

/// How a requirement is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Linked into the package.
    Host,
    /// Runs on the build machine only.
    BuildTool,
    /// Only needed to build and run tests.
    Test,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Host => "host",
            Role::BuildTool => "build-tool",
            Role::Test => "test",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A pinned reference known at compile time.
#[derive(Debug, Clone, Copy)]
pub struct Pin {
    pub name: &'static str,
    pub version: &'static str,
    pub channel: Option<(&'static str, &'static str)>,
}

impl Pin {
    const fn new(name: &'static str, version: &'static str) -> Self {
        Pin {
            name,
            version,
            channel: None,
        }
    }

    const fn sintef(name: &'static str, version: &'static str) -> Self {
        Pin {
            name,
            version,
            channel: Some(("sintef", "stable")),
        }
    }

    pub fn reference(&self) -> PackageRef {
        let reference = PackageRef::new(PackageName::from_static(self.name), self.version);
        match self.channel {
            Some((user, channel)) => reference.with_channel(user, channel),
            None => reference,
        }
    }
}

/// FMI compatibility shim; also seeds `fmi_functions.cpp` into the build.
pub const FMI_SHIM: Pin = Pin::sintef("cppfmu", "1.0.0");
pub const DDS_MIDDLEWARE: Pin = Pin::new("fast-dds", "2.11.2");
pub const UUID_LIB: Pin = Pin::new("stduuid", "1.2.3");
pub const XML_PARSER: Pin = Pin::new("rapidxml", "1.13");
pub const XTYPES_LIB: Pin = Pin::sintef("eprosima-xtypes", "cci.20230615");

pub const ARCHIVE_LIB: Pin = Pin::new("kuba-zip", "0.3.2");
pub const ARG_PARSER: Pin = Pin::new("taywee-args", "6.4.6");

pub const NATIVE_BUILD_TOOL: Pin = Pin::new("cmake", "[>=3.18.0 <4]");
pub const BUILD_HELPER: Pin = Pin::sintef("fmu-build-helper", "1.0.0");

pub const COMPLIANCE_CHECKER: Pin = Pin::sintef("fmu-compliance-checker", "2.0.4");
pub const TEST_FRAMEWORK: Pin = Pin::new("gtest", "1.13.0");

pub const DOC_GENERATOR: Pin = Pin::new("doxygen", "1.9.4");
/// Needed by the documentation generator on Windows only.
pub const SCRIPT_INTERPRETER: Pin = Pin::new("strawberryperl", "5.32.1.1");

const BASELINE_HOST: [Pin; 5] = [FMI_SHIM, DDS_MIDDLEWARE, UUID_LIB, XML_PARSER, XTYPES_LIB];

/// A single role-tagged requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub reference: PackageRef,
    pub role: Role,
}

impl Requirement {
    pub fn name(&self) -> &PackageName {
        self.reference.name()
    }
}

/// Ordered requirement list in which every package name appears once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequirementGraph {
    entries: Vec<Requirement>,
}

impl RequirementGraph {
    pub fn new() -> Self {
        RequirementGraph::default()
    }

    /// Append a requirement. Returns `false` and leaves the graph unchanged
    /// if a requirement with the same name is already present.
    pub fn add(&mut self, reference: PackageRef, role: Role) -> bool {
        if self.contains(reference.name().as_str()) {
            tracing::debug!("skipping duplicate requirement {}", reference);
            return false;
        }
        self.entries.push(Requirement { reference, role });
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.entries.iter().find(|r| r.name().as_str() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.entries.iter()
    }

    pub fn with_role(&self, role: Role) -> impl Iterator<Item = &Requirement> {
        self.entries.iter().filter(move |r| r.role == role)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for RequirementGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for req in &self.entries {
            writeln!(f, "{:<12} {}", req.role, req.reference)?;
        }
        Ok(())
    }
}

/// Build the complete requirement graph.
///
/// Every rule is additive and evaluated independently:
/// - five baseline host libraries, always
/// - archive and argument-parser libraries when `with_tools`
/// - CMake and the FMU build helper, always
/// - compliance checker and test framework when `with_tests`
/// - doxygen when `with_doc`, plus perl on Windows
pub fn requirements(
    options: &ResolvedOptions,
    with_tests: bool,
    settings: &Settings,
) -> RequirementGraph {
    let mut graph = RequirementGraph::new();

    for pin in BASELINE_HOST {
        graph.add(pin.reference(), Role::Host);
    }

    if options.with_tools() {
        graph.add(ARCHIVE_LIB.reference(), Role::Host);
        graph.add(ARG_PARSER.reference(), Role::Host);
    }

    graph.add(NATIVE_BUILD_TOOL.reference(), Role::BuildTool);
    graph.add(BUILD_HELPER.reference(), Role::BuildTool);

    if with_tests {
        graph.add(COMPLIANCE_CHECKER.reference(), Role::BuildTool);
        graph.add(TEST_FRAMEWORK.reference(), Role::Test);
    }

    if options.with_doc() {
        graph.add(DOC_GENERATOR.reference(), Role::BuildTool);
        if settings.is_windows() {
            graph.add(SCRIPT_INTERPRETER.reference(), Role::BuildTool);
        }
    }

    graph
}
