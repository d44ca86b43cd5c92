//! The native build system interface.
//!
//! The lifecycle drives a `BuildSystem` one phase at a time. Every method
//! blocks until the external tool exits and returns an error carrying its
//! exit status on failure; the tool's own output goes straight to the
//! terminal.

use anyhow::Result;

/// Operations the lifecycle needs from a native build system.
pub trait BuildSystem {
    /// Short name for log messages.
    fn name(&self) -> &str;

    /// Generate the native build tree.
    fn configure(&self) -> Result<()>;

    /// Build `target`, or the default target when `None`.
    fn build(&self, target: Option<&str>) -> Result<()>;

    /// Install `component`, or everything when `None`.
    fn install(&self, component: Option<&str>) -> Result<()>;

    /// Run the project's test suite.
    fn test(&self) -> Result<()>;
}

/// Whether the build system's executable can be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available {
        version: semver::Version,
    },
    NotInstalled {
        tool: String,
        install_hint: String,
    },
    /// Installed, but outside the supported range (too old or too new).
    VersionUnsupported {
        found: semver::Version,
        required: semver::VersionReq,
    },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available { .. })
    }

    pub fn error_message(&self) -> Option<String> {
        match self {
            Availability::Available { .. } => None,
            Availability::NotInstalled { tool, install_hint } => {
                Some(format!("{} not found. {}", tool, install_hint))
            }
            Availability::VersionUnsupported { found, required } => Some(format!(
                "version {} found, but {} is supported",
                found, required
            )),
        }
    }
}
