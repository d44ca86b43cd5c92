//! Recipe error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::language::CppStandard;
use crate::util::diagnostic::Diagnostic;

/// Fatal conditions raised while evaluating or building a recipe.
///
/// None of these are retried. Operations return them wrapped in
/// `anyhow::Error`; callers recover the variant with `downcast_ref`.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum RecipeError {
    #[error("{reference} requires {required}, which your compiler does not support: {reason}")]
    #[diagnostic(code(stevedore::validate::incompatible))]
    ConfigurationIncompatibility {
        reference: String,
        required: CppStandard,
        reason: String,
    },

    #[error("cannot determine recipe version from `{}`: {reason}", path.display())]
    #[diagnostic(code(stevedore::recipe::missing_version))]
    MissingVersionSource { path: PathBuf, reason: String },

    #[error("{phase} phase failed: {message}")]
    #[diagnostic(code(stevedore::build::external_failure))]
    ExternalBuildFailure { phase: String, message: String },

    #[error("hook `{hook}` failed: {message}")]
    #[diagnostic(code(stevedore::hook::side_effect))]
    HookSideEffectFailure { hook: String, message: String },

    #[error("unknown option `{name}`")]
    #[diagnostic(code(stevedore::options::unknown))]
    InvalidOption { name: String, known: Vec<String> },

    #[error("invalid setting `{key}`: {message}")]
    #[diagnostic(code(stevedore::settings::invalid))]
    InvalidSetting { key: String, message: String },

    #[error("invalid package name `{name}`: {message}")]
    #[diagnostic(code(stevedore::recipe::invalid_name))]
    InvalidPackageName { name: String, message: String },

    #[error("hook `{hook}` is already registered for `{package}`")]
    #[diagnostic(code(stevedore::hook::duplicate))]
    DuplicateHook { hook: String, package: String },
}

impl RecipeError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RecipeError::ConfigurationIncompatibility {
                reference,
                required,
                reason,
            } => Diagnostic::error(format!("`{}` requires {}", reference, required))
                .with_context(reason.clone())
                .with_suggestion(format!(
                    "Select a compiler that supports {} (`-s compiler.version=...`)",
                    required
                ))
                .with_suggestion(format!(
                    "Raise `compiler.cppstd` to {} or later",
                    required.as_number()
                )),

            RecipeError::MissingVersionSource { path, reason } => {
                Diagnostic::error("recipe version could not be read")
                    .with_location(path)
                    .with_context(reason.clone())
                    .with_suggestion("Create `version.txt` next to `Recipe.toml`")
            }

            RecipeError::ExternalBuildFailure { phase, message } => {
                Diagnostic::error(format!("{} phase failed", phase))
                    .with_context(message.clone())
                    .with_suggestion("Inspect the build system output above")
            }

            RecipeError::HookSideEffectFailure { hook, message } => {
                Diagnostic::error(format!("hook `{}` failed", hook))
                    .with_context(message.clone())
                    .with_context("compiled output is intact; only CI packaging is affected")
            }

            RecipeError::InvalidOption { name, known } => {
                Diagnostic::error(format!("unknown option `{}`", name))
                    .with_context(format!("known options: {}", known.join(", ")))
            }

            RecipeError::InvalidSetting { key, message } => {
                Diagnostic::error(format!("invalid setting `{}`", key)).with_context(message.clone())
            }

            RecipeError::InvalidPackageName { name, message } => {
                Diagnostic::error(format!("invalid package name `{}`", name))
                    .with_context(message.clone())
            }

            RecipeError::DuplicateHook { hook, package } => Diagnostic::error(format!(
                "hook `{}` registered twice for `{}`",
                hook, package
            )),
        }
    }
}
