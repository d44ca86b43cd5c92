//! Generation and the native build system.
//!
//! This module turns an evaluated recipe into files the native build reads
//! (toolchain, dependency wiring, license report) and wraps the CMake
//! invocations the lifecycle runs.

pub mod backend;
pub mod cmake;
pub mod context;
pub mod deps;
pub mod licenses;
pub mod toolchain;

pub use backend::{Availability, BuildSystem};
pub use cmake::CMakeBuildSystem;
pub use context::BuildLayout;
pub use deps::{load_deps, DependencyInfo, License};
pub use licenses::{LicenseFormat, LicenseManifest};
pub use toolchain::ToolchainConfig;
