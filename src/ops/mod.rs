//! High-level operations.
//!
//! This module contains the implementation of Stevedore commands.

pub mod evaluate;
pub mod generate;
pub mod lifecycle;
pub mod stevedore_build;

pub use evaluate::{evaluate, evaluate_with, skip_test_flag, EvaluateOptions, Evaluation};
pub use generate::{build_layout, generate, seed_shim, GenerateOptions, GenerateReport};
pub use lifecycle::{Phase, Pipeline, PipelineReport};
pub use stevedore_build::{build, build_with, BuildOptions, BuildOutcome};
