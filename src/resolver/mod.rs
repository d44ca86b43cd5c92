//! Requirement declaration and compatibility checking.
//!
//! Both stages are pure: they read resolved options and settings and never
//! touch the network or the filesystem. Fetching the declared packages is
//! left to the external package manager, which reports back through
//! `deps.json`.

pub mod compat;
pub mod requirements;

pub use compat::{validate, Compatibility, MIN_CPP_STANDARD};
pub use requirements::{requirements, Requirement, RequirementGraph, Role};
