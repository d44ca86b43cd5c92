//! Profiles: settings, option overrides and build configuration.
//!
//! A profile is a TOML file:
//!
//! ```toml
//! [settings]
//! os = "Linux"
//! arch = "x86_64"
//! build_type = "Release"
//!
//! [settings.compiler]
//! family = "gcc"
//! version = "11.2"
//! cppstd = "17"
//!
//! [options]
//! with_doc = true
//!
//! [conf]
//! skip_test = false
//! ```
//!
//! Command-line `-s`/`-o` pairs are layered on top. Settings absent from
//! both are detected from the host.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::errors::RecipeError;
use crate::core::language::CppStandard;
use crate::core::settings::{Arch, BuildType, CompilerSettings, Os, Settings};

/// Raw `[settings.compiler]` values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompilerSpec {
    pub family: Option<String>,
    pub version: Option<String>,
    pub cppstd: Option<String>,
}

/// Raw `[settings]` values, not yet validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsSpec {
    pub os: Option<String>,
    pub arch: Option<String>,
    pub build_type: Option<String>,
    pub compiler: CompilerSpec,
}

/// Build configuration flags (`[conf]`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfSpec {
    /// Skip building and running tests. Unset means "use the config default".
    pub skip_test: Option<bool>,
}

/// A parsed profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub settings: SettingsSpec,
    pub options: BTreeMap<String, bool>,
    pub conf: ConfSpec,
}

impl Profile {
    /// Load a profile from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse profile: {}", path.display()))
    }

    /// Apply a `-s key=value` override.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<(), RecipeError> {
        let slot = match key {
            "os" => &mut self.settings.os,
            "arch" => &mut self.settings.arch,
            "build_type" => &mut self.settings.build_type,
            "compiler" => &mut self.settings.compiler.family,
            "compiler.version" => &mut self.settings.compiler.version,
            "compiler.cppstd" => &mut self.settings.compiler.cppstd,
            _ => {
                return Err(RecipeError::InvalidSetting {
                    key: key.to_string(),
                    message: "expected one of os, arch, build_type, compiler, \
                              compiler.version, compiler.cppstd"
                        .to_string(),
                })
            }
        };
        *slot = Some(value.to_string());
        Ok(())
    }

    /// Apply a `-o key=value` override.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), RecipeError> {
        let value = parse_bool(value).ok_or_else(|| RecipeError::InvalidSetting {
            key: key.to_string(),
            message: format!("`{}` is not a boolean", value),
        })?;
        self.options.insert(key.to_string(), value);
        Ok(())
    }

    /// Option overrides in a stable order.
    pub fn option_overrides(&self) -> Vec<(String, bool)> {
        self.options
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Validate settings, filling gaps from the host.
    ///
    /// `detect_compiler` is only called when no compiler family is given.
    pub fn resolve_settings(
        &self,
        detect_compiler: impl FnOnce() -> Option<CompilerSettings>,
    ) -> Result<Settings, RecipeError> {
        let spec = &self.settings;

        let os = match &spec.os {
            Some(os) => os.parse().unwrap_or_else(|e| match e {}),
            None => Os::host(),
        };
        let arch = match &spec.arch {
            Some(arch) => arch.parse().unwrap_or_else(|e| match e {}),
            None => Arch::host(),
        };
        let build_type = match &spec.build_type {
            Some(bt) => bt.parse()?,
            None => BuildType::default(),
        };

        let cppstd = spec
            .compiler
            .cppstd
            .as_deref()
            .map(|s| s.parse::<CppStandard>())
            .transpose()
            .map_err(|e| RecipeError::InvalidSetting {
                key: "compiler.cppstd".to_string(),
                message: e.to_string(),
            })?;

        let compiler = match (&spec.compiler.family, &spec.compiler.version) {
            (Some(family), Some(version)) => CompilerSettings {
                family: family.parse().unwrap_or_else(|e| match e {}),
                version: version.parse()?,
                cppstd,
            },
            (Some(_), None) => {
                return Err(RecipeError::InvalidSetting {
                    key: "compiler.version".to_string(),
                    message: "a compiler family was given without a version".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(RecipeError::InvalidSetting {
                    key: "compiler".to_string(),
                    message: "a compiler version was given without a compiler family".to_string(),
                })
            }
            (None, None) => {
                let mut detected =
                    detect_compiler().ok_or_else(|| RecipeError::InvalidSetting {
                        key: "compiler".to_string(),
                        message: "no compiler configured and none found on PATH".to_string(),
                    })?;
                detected.cppstd = cppstd;
                detected
            }
        };

        Ok(Settings {
            os,
            arch,
            compiler,
            build_type,
        })
    }
}

/// Split a `key=value` argument.
pub fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected `key=value`, got `{}`", arg)),
    }
}

/// Parse the boolean spellings accepted in profiles and on the command line.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::CompilerFamily;

    const PROFILE: &str = r#"
[settings]
os = "Windows"
arch = "x86_64"
build_type = "Debug"

[settings.compiler]
family = "msvc"
version = "193"
cppstd = "17"

[options]
with_doc = true

[conf]
skip_test = false
"#;

    #[test]
    fn test_parse_profile() {
        let profile: Profile = toml::from_str(PROFILE).unwrap();
        let settings = profile.resolve_settings(|| None).unwrap();

        assert_eq!(settings.os, Os::Windows);
        assert_eq!(settings.build_type, BuildType::Debug);
        assert_eq!(settings.compiler.family, CompilerFamily::Msvc);
        assert_eq!(settings.compiler.cppstd, Some(CppStandard::Cpp17));
        assert_eq!(profile.option_overrides(), vec![("with_doc".to_string(), true)]);
        assert_eq!(profile.conf.skip_test, Some(false));
    }

    #[test]
    fn test_cli_overrides_profile() {
        let mut profile: Profile = toml::from_str(PROFILE).unwrap();
        profile.set_setting("os", "Linux").unwrap();
        profile.set_setting("compiler", "gcc").unwrap();
        profile.set_setting("compiler.version", "7.0").unwrap();
        profile.set_option("with_doc", "False").unwrap();

        let settings = profile.resolve_settings(|| None).unwrap();
        assert_eq!(settings.os, Os::Linux);
        assert_eq!(settings.compiler.family, CompilerFamily::Gcc);
        assert_eq!(settings.compiler.version.to_string(), "7.0");
        assert_eq!(profile.options.get("with_doc"), Some(&false));
    }

    #[test]
    fn test_unknown_setting_key() {
        let mut profile = Profile::default();
        assert!(profile.set_setting("compiler.libcxx", "libstdc++11").is_err());
        assert!(profile.set_option("with_doc", "maybe").is_err());
    }

    #[test]
    fn test_missing_compiler_uses_detection() {
        let profile = Profile::default();
        let settings = profile
            .resolve_settings(|| {
                Some(CompilerSettings {
                    family: CompilerFamily::Clang,
                    version: "14.0.6".parse().unwrap(),
                    cppstd: None,
                })
            })
            .unwrap();
        assert_eq!(settings.compiler.family, CompilerFamily::Clang);

        let err = profile.resolve_settings(|| None).unwrap_err();
        assert!(matches!(err, RecipeError::InvalidSetting { ref key, .. } if key == "compiler"));
    }

    #[test]
    fn test_version_without_family_is_rejected() {
        let mut profile = Profile::default();
        profile.set_setting("compiler.version", "11").unwrap();

        let err = profile
            .resolve_settings(|| {
                Some(CompilerSettings {
                    family: CompilerFamily::Clang,
                    version: "14.0.6".parse().unwrap(),
                    cppstd: None,
                })
            })
            .unwrap_err();
        assert!(matches!(err, RecipeError::InvalidSetting { ref key, .. } if key == "compiler"));
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("os=Windows").unwrap(),
            ("os".to_string(), "Windows".to_string())
        );
        assert!(parse_key_value("os").is_err());
        assert!(parse_key_value("=Windows").is_err());
    }
}
