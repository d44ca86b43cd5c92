//! Recipe options and their platform-dependent resolution.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::errors::RecipeError;
use crate::core::settings::Settings;

/// Position-independent code. Meaningless for MSVC, so never offered on Windows.
pub const FPIC: &str = "fPIC";

/// Build the command-line tools (pulls in the archive and argument libraries).
pub const WITH_TOOLS: &str = "with_tools";

/// Build and install the documentation.
pub const WITH_DOC: &str = "with_doc";

/// Declared options with their defaults. Every domain is boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSchema {
    defaults: BTreeMap<String, bool>,
}

impl OptionSchema {
    /// Create a schema from `(name, default)` pairs.
    pub fn new<'a>(defaults: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        OptionSchema {
            defaults: defaults
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// The dds-fmu option set: `fPIC=true`, `with_tools=true`, `with_doc=false`.
    pub fn dds_fmu() -> Self {
        OptionSchema::new([(FPIC, true), (WITH_TOOLS, true), (WITH_DOC, false)])
    }

    pub fn declares(&self, name: &str) -> bool {
        self.defaults.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defaults.keys().map(String::as_str)
    }
}

impl Default for OptionSchema {
    fn default() -> Self {
        OptionSchema::dds_fmu()
    }
}

/// Option values after platform-conditional removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    values: BTreeMap<String, bool>,
}

/// Resolve options for the given settings.
///
/// Starts from the schema defaults and removes `fPIC` entirely on Windows.
pub fn resolve_options(schema: &OptionSchema, settings: &Settings) -> ResolvedOptions {
    let mut values = schema.defaults.clone();

    if settings.is_windows() {
        values.remove(FPIC);
    }

    ResolvedOptions { values }
}

impl ResolvedOptions {
    /// Apply user overrides, validated against the schema.
    ///
    /// Unknown names are an error. Overrides for options the platform
    /// removed are dropped, since the option is not offered at all.
    pub fn apply_overrides(
        &mut self,
        schema: &OptionSchema,
        overrides: &[(String, bool)],
    ) -> Result<(), RecipeError> {
        for (name, value) in overrides {
            if !schema.declares(name) {
                return Err(RecipeError::InvalidOption {
                    name: name.clone(),
                    known: schema.names().map(str::to_string).collect(),
                });
            }

            match self.values.get_mut(name) {
                Some(slot) => *slot = *value,
                None => tracing::debug!("ignoring override for removed option `{}`", name),
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn with_tools(&self) -> bool {
        self.get(WITH_TOOLS).unwrap_or(false)
    }

    pub fn with_doc(&self) -> bool {
        self.get(WITH_DOC).unwrap_or(false)
    }

    /// `None` when the option was removed for this platform.
    pub fn fpic(&self) -> Option<bool> {
        self.get(FPIC)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::settings_for;

    #[test]
    fn test_defaults_on_linux() {
        let options = resolve_options(&OptionSchema::dds_fmu(), &settings_for("Linux"));

        assert_eq!(options.fpic(), Some(true));
        assert!(options.with_tools());
        assert!(!options.with_doc());
    }

    #[test]
    fn test_fpic_removed_on_windows() {
        let schema = OptionSchema::dds_fmu();
        let mut options = resolve_options(&schema, &settings_for("Windows"));
        assert!(!options.contains(FPIC));

        // Overriding a removed option must not bring it back
        options
            .apply_overrides(&schema, &[(FPIC.to_string(), true)])
            .unwrap();
        assert!(!options.contains(FPIC));
    }

    #[test]
    fn test_fpic_never_present_on_windows_for_any_override() {
        let schema = OptionSchema::dds_fmu();
        for tools in [true, false] {
            for doc in [true, false] {
                for fpic in [true, false] {
                    let mut options = resolve_options(&schema, &settings_for("Windows"));
                    options
                        .apply_overrides(
                            &schema,
                            &[
                                (WITH_TOOLS.to_string(), tools),
                                (WITH_DOC.to_string(), doc),
                                (FPIC.to_string(), fpic),
                            ],
                        )
                        .unwrap();
                    assert!(options.fpic().is_none());
                }
            }
        }
    }

    #[test]
    fn test_unknown_override_rejected() {
        let schema = OptionSchema::dds_fmu();
        let mut options = resolve_options(&schema, &settings_for("Linux"));

        let err = options
            .apply_overrides(&schema, &[("shared".to_string(), true)])
            .unwrap_err();
        assert!(matches!(err, RecipeError::InvalidOption { ref name, .. } if name == "shared"));
    }

    #[test]
    fn test_override_applies() {
        let schema = OptionSchema::dds_fmu();
        let mut options = resolve_options(&schema, &settings_for("Linux"));
        options
            .apply_overrides(&schema, &[(WITH_DOC.to_string(), true)])
            .unwrap();
        assert!(options.with_doc());
        assert_eq!(options.to_string(), "fPIC=true\nwith_doc=true\nwith_tools=true\n");
    }
}
