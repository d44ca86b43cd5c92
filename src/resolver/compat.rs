//! Compiler compatibility validation.
//!
//! The recipe needs C++17. A configuration passes if it does not pin an
//! older standard and its compiler is at least the first release of that
//! family with usable C++17 support. Families outside the table are let
//! through with a warning instead of being guessed at.

use crate::core::errors::RecipeError;
use crate::core::language::CppStandard;
use crate::core::package_id::PackageRef;
use crate::core::settings::{CompilerFamily, CompilerSettings, CompilerVersion};
use crate::util::diagnostic::Diagnostic;

/// Minimum language standard the recipe compiles with.
pub const MIN_CPP_STANDARD: CppStandard = CppStandard::Cpp17;

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// The compiler meets the known minimum.
    Verified,
    /// The family has no table entry; nothing was checked.
    Unverified { family: String },
}

impl Compatibility {
    pub fn is_verified(&self) -> bool {
        matches!(self, Compatibility::Verified)
    }

    /// A warning for an unchecked compiler. With `verbose`, the known
    /// minimums are listed as context.
    pub fn warning(&self, reference: &PackageRef, verbose: bool) -> Option<Diagnostic> {
        let Compatibility::Unverified { family } = self else {
            return None;
        };

        let mut diag = Diagnostic::warning(format!(
            "compiler `{}` has no known minimum version for {}",
            family, reference
        ))
        .with_suggestion(format!(
            "Make sure `{}` supports {} before building",
            family, MIN_CPP_STANDARD
        ));
        if verbose {
            for known in [
                CompilerFamily::Msvc,
                CompilerFamily::Gcc,
                CompilerFamily::Clang,
                CompilerFamily::AppleClang,
            ] {
                if let Some(min) = minimum_version(&known) {
                    diag = diag.with_context(format!("{} >= {}", known, min));
                }
            }
        }
        Some(diag)
    }
}

/// First version of each known family with C++17 support.
pub fn minimum_version(family: &CompilerFamily) -> Option<CompilerVersion> {
    let (major, minor) = match family {
        CompilerFamily::Msvc => (14, 1),
        CompilerFamily::Gcc => (8, 1),
        CompilerFamily::Clang => (7, 0),
        CompilerFamily::AppleClang => (10, 0),
        CompilerFamily::Unrecognized(_) => return None,
    };
    Some(CompilerVersion::from_parts(major, minor))
}

/// Check a compiler configuration against the recipe's requirements.
///
/// Runs before anything is generated or built; an error here is final.
pub fn validate(
    reference: &PackageRef,
    compiler: &CompilerSettings,
) -> Result<Compatibility, RecipeError> {
    let incompatible = |reason: String| RecipeError::ConfigurationIncompatibility {
        reference: reference.to_string(),
        required: MIN_CPP_STANDARD,
        reason,
    };

    if let Some(cppstd) = compiler.cppstd {
        if cppstd < MIN_CPP_STANDARD {
            return Err(incompatible(format!(
                "compiler.cppstd is set to {}",
                cppstd.as_number()
            )));
        }
    }

    let Some(minimum) = minimum_version(&compiler.family) else {
        tracing::warn!(
            "{} is not a known compiler; assuming it supports {}",
            compiler.family,
            MIN_CPP_STANDARD
        );
        return Ok(Compatibility::Unverified {
            family: compiler.family.to_string(),
        });
    };

    if compiler.version < minimum {
        return Err(incompatible(format!(
            "{} {} is older than {}",
            compiler.family, compiler.version, minimum
        )));
    }

    tracing::debug!(
        "{} {} satisfies {} (minimum {})",
        compiler.family,
        compiler.version,
        MIN_CPP_STANDARD,
        minimum
    );
    Ok(Compatibility::Verified)
}
