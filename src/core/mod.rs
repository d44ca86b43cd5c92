//! Core data structures for Stevedore.
//!
//! This module contains the foundational types used throughout Stevedore:
//! - Package names and pinned references
//! - The recipe manifest and its version sidecar
//! - Platform settings, options and profiles
//! - The error taxonomy shared by every stage

pub mod errors;
pub mod language;
pub mod manifest;
pub mod options;
pub mod package_id;
pub mod profile;
pub mod settings;

pub use errors::RecipeError;
pub use language::CppStandard;
pub use manifest::{PackageIdentity, PackageMetadata, PackageType, Recipe, MANIFEST_NAME, VERSION_FILE};
pub use options::{resolve_options, OptionSchema, ResolvedOptions};
pub use package_id::{PackageName, PackageRef};
pub use profile::Profile;
pub use settings::{Arch, BuildType, CompilerFamily, CompilerSettings, CompilerVersion, Os, Settings};
