//! Platform settings a recipe is evaluated against.
//!
//! Settings are read-only once constructed. Values are parsed leniently
//! from the spellings package managers commonly use (`Linux`, `armv8`,
//! `apple-clang`) and fall back to an explicit catch-all variant instead of
//! failing, except for compiler versions, which must be numeric.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::Version;

use crate::core::errors::RecipeError;
use crate::core::language::CppStandard;
use crate::util::process::{find_c_compiler, ProcessBuilder};

/// Target operating system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Macos,
    Windows,
    Other(String),
}

impl Os {
    /// The OS this binary was compiled for.
    pub fn host() -> Self {
        std::env::consts::OS.parse().unwrap_or(Os::Linux)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Os::Linux => "Linux",
            Os::Macos => "Macos",
            Os::Windows => "Windows",
            Os::Other(s) => s,
        }
    }
}

impl FromStr for Os {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "linux" => Os::Linux,
            "macos" | "darwin" => Os::Macos,
            "windows" => Os::Windows,
            _ => Os::Other(s.to_string()),
        })
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    X86_64,
    Armv8,
    Other(String),
}

impl Arch {
    /// The architecture this binary was compiled for.
    pub fn host() -> Self {
        std::env::consts::ARCH.parse().unwrap_or(Arch::X86_64)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Armv8 => "armv8",
            Arch::Other(s) => s,
        }
    }
}

impl FromStr for Arch {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "x86" | "i686" => Arch::X86,
            "x86_64" | "amd64" => Arch::X86_64,
            "armv8" | "aarch64" | "arm64" => Arch::Armv8,
            _ => Arch::Other(s.to_string()),
        })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CMake build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err(RecipeError::InvalidSetting {
                key: "build_type".to_string(),
                message: format!(
                    "`{}` is not one of Debug, Release, RelWithDebInfo, MinSizeRel",
                    s
                ),
            }),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler families the recipe knows minimum versions for.
///
/// Anything else parses to `Unrecognized` so the compatibility check can
/// report it explicitly rather than guessing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompilerFamily {
    Msvc,
    Gcc,
    Clang,
    AppleClang,
    Unrecognized(String),
}

impl CompilerFamily {
    pub fn as_str(&self) -> &str {
        match self {
            CompilerFamily::Msvc => "msvc",
            CompilerFamily::Gcc => "gcc",
            CompilerFamily::Clang => "clang",
            CompilerFamily::AppleClang => "apple-clang",
            CompilerFamily::Unrecognized(name) => name,
        }
    }
}

impl FromStr for CompilerFamily {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "msvc" | "cl" => CompilerFamily::Msvc,
            "gcc" | "g++" => CompilerFamily::Gcc,
            "clang" | "clang++" => CompilerFamily::Clang,
            "apple-clang" => CompilerFamily::AppleClang,
            _ => CompilerFamily::Unrecognized(s.to_string()),
        })
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dotted numeric compiler version such as `7`, `8.1` or `14.1`.
///
/// Missing components are zero, so `7` == `7.0` == `7.0.0`. Components
/// past the third are kept in the display form but ignored for ordering.
#[derive(Debug, Clone)]
pub struct CompilerVersion {
    raw: String,
    normalized: Version,
}

impl CompilerVersion {
    /// `major.minor`, displayed without a trailing `.0` minor.
    pub fn from_parts(major: u64, minor: u64) -> Self {
        let raw = if minor == 0 {
            major.to_string()
        } else {
            format!("{}.{}", major, minor)
        };
        CompilerVersion {
            raw,
            normalized: Version::new(major, minor, 0),
        }
    }
}

impl FromStr for CompilerVersion {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || RecipeError::InvalidSetting {
            key: "compiler.version".to_string(),
            message: format!("`{}` is not a dotted numeric version", s),
        };

        let mut parts = [0u64; 3];
        for (i, component) in raw.split('.').enumerate() {
            let value: u64 = component.parse().map_err(|_| invalid())?;
            if i < parts.len() {
                parts[i] = value;
            }
        }

        Ok(CompilerVersion {
            raw: raw.to_string(),
            normalized: Version::new(parts[0], parts[1], parts[2]),
        })
    }
}

impl PartialEq for CompilerVersion {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for CompilerVersion {}

impl PartialOrd for CompilerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompilerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl fmt::Display for CompilerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// The `compiler` sub-setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
    pub family: CompilerFamily,
    pub version: CompilerVersion,
    /// Explicit language standard, if the configuration declares one.
    pub cppstd: Option<CppStandard>,
}

/// The complete, read-only settings tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub os: Os,
    pub arch: Arch,
    pub compiler: CompilerSettings,
    pub build_type: BuildType,
}

impl Settings {
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }
}

/// Detect the host compiler by asking it for its version banner.
///
/// Honors `CC`, then searches PATH for common compilers.
pub fn detect_host_compiler() -> Option<CompilerSettings> {
    let cc = find_c_compiler()?;

    // cl.exe prints its banner to stderr and rejects --version
    let output = ProcessBuilder::new(&cc).arg("--version").exec().ok()?;
    let mut banner = String::from_utf8_lossy(&output.stdout).into_owned();
    banner.push_str(&String::from_utf8_lossy(&output.stderr));

    let (family, version) = parse_compiler_banner(&banner)?;
    tracing::debug!("detected host compiler {} {} at {}", family, version, cc.display());

    Some(CompilerSettings {
        family,
        version,
        cppstd: None,
    })
}

/// Extract family and version from the first line of a compiler banner.
pub fn parse_compiler_banner(banner: &str) -> Option<(CompilerFamily, CompilerVersion)> {
    let first = banner.lines().find(|l| !l.trim().is_empty())?;
    let lower = first.to_ascii_lowercase();

    let family = if lower.contains("apple clang") {
        CompilerFamily::AppleClang
    } else if lower.contains("clang") {
        CompilerFamily::Clang
    } else if lower.contains("microsoft") {
        CompilerFamily::Msvc
    } else if lower.contains("gcc") || lower.contains("g++") || lower.contains("free software") {
        CompilerFamily::Gcc
    } else {
        return None;
    };

    let dotted = |text: &str| -> Vec<CompilerVersion> {
        text.split_whitespace()
            .filter_map(|token| {
                let token = token.trim_matches(|c: char| !c.is_ascii_digit() && c != '.');
                if token.contains('.') {
                    token.parse::<CompilerVersion>().ok()
                } else {
                    None
                }
            })
            .collect()
    };

    // clang and cl say "version X"; gcc puts the version last
    let version = match lower.find("version ") {
        Some(pos) => dotted(&first[pos..]).into_iter().next(),
        None => dotted(first).pop(),
    }?;

    Some((family, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_parsing() {
        assert_eq!("Windows".parse::<Os>().unwrap(), Os::Windows);
        assert_eq!("darwin".parse::<Os>().unwrap(), Os::Macos);
        assert_eq!(
            "FreeBSD".parse::<Os>().unwrap(),
            Os::Other("FreeBSD".to_string())
        );
    }

    #[test]
    fn test_compiler_version_padding() {
        let seven: CompilerVersion = "7".parse().unwrap();
        let seven_zero: CompilerVersion = "7.0".parse().unwrap();
        let eight_one: CompilerVersion = "8.1".parse().unwrap();

        assert_eq!(seven, seven_zero);
        assert!(seven < eight_one);
        assert_eq!(seven.to_string(), "7");
        assert!("eleven".parse::<CompilerVersion>().is_err());
    }

    #[test]
    fn test_unknown_family_is_explicit() {
        assert_eq!(
            "intel-cc".parse::<CompilerFamily>().unwrap(),
            CompilerFamily::Unrecognized("intel-cc".to_string())
        );
        assert_eq!(
            "apple-clang".parse::<CompilerFamily>().unwrap(),
            CompilerFamily::AppleClang
        );
    }

    #[test]
    fn test_parse_gcc_banner() {
        let banner = "gcc (Ubuntu 11.4.0-1ubuntu1~22.04) 11.4.0\nCopyright (C) 2021";
        let (family, version) = parse_compiler_banner(banner).unwrap();
        assert_eq!(family, CompilerFamily::Gcc);
        assert_eq!(version.to_string(), "11.4.0");
    }

    #[test]
    fn test_parse_clang_banners() {
        let (family, version) = parse_compiler_banner("clang version 14.0.6\nTarget: x86_64").unwrap();
        assert_eq!(family, CompilerFamily::Clang);
        assert_eq!(version.to_string(), "14.0.6");

        let (family, version) =
            parse_compiler_banner("Apple clang version 15.0.0 (clang-1500.0.40.1)").unwrap();
        assert_eq!(family, CompilerFamily::AppleClang);
        assert_eq!(version.to_string(), "15.0.0");
    }

    #[test]
    fn test_build_type_parsing() {
        assert_eq!("release".parse::<BuildType>().unwrap(), BuildType::Release);
        assert!("fast".parse::<BuildType>().is_err());
    }
}
