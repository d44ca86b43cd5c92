//! Stevedore - an evaluator for the dds-fmu package recipe
//!
//! This crate turns build options and platform settings into a requirement
//! graph, a validated toolchain, a license report and an ordered native
//! build pipeline, with hooks that hand artifacts to CI.

pub mod builder;
pub mod core;
pub mod hooks;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for Stevedore unit tests.
#[cfg(test)]
pub mod test_support;

pub use core::{
    errors::RecipeError, manifest::PackageIdentity, manifest::Recipe, package_id::PackageName,
    package_id::PackageRef, settings::Settings,
};

pub use resolver::RequirementGraph;
pub use util::context::GlobalContext;
