//! C++ language standards.
//!
//! Settings may declare an explicit `compiler.cppstd`; the compatibility
//! check compares it against the recipe's minimum standard.

use serde::{Deserialize, Serialize};

/// C++ standard version.
///
/// GNU dialects (`gnu17`) compare equal to their ISO counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CppStandard {
    /// C++98
    #[serde(rename = "98", alias = "c++98", alias = "gnu98")]
    Cpp98,
    /// C++11
    #[serde(rename = "11", alias = "c++11", alias = "gnu11")]
    Cpp11,
    /// C++14
    #[serde(rename = "14", alias = "c++14", alias = "gnu14")]
    Cpp14,
    /// C++17
    #[serde(rename = "17", alias = "c++17", alias = "gnu17")]
    Cpp17,
    /// C++20
    #[serde(rename = "20", alias = "c++20", alias = "gnu20")]
    Cpp20,
    /// C++23
    #[serde(rename = "23", alias = "c++23", alias = "gnu23")]
    Cpp23,
}

impl CppStandard {
    /// The bare number, as CMake's `CMAKE_CXX_STANDARD` expects it.
    pub fn as_number(&self) -> &'static str {
        match self {
            CppStandard::Cpp98 => "98",
            CppStandard::Cpp11 => "11",
            CppStandard::Cpp14 => "14",
            CppStandard::Cpp17 => "17",
            CppStandard::Cpp20 => "20",
            CppStandard::Cpp23 => "23",
        }
    }
}

impl std::str::FromStr for CppStandard {
    type Err = CppStandardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s
            .strip_prefix("c++")
            .or_else(|| s.strip_prefix("gnu"))
            .unwrap_or(s);
        match bare {
            "98" => Ok(CppStandard::Cpp98),
            "11" => Ok(CppStandard::Cpp11),
            "14" => Ok(CppStandard::Cpp14),
            "17" => Ok(CppStandard::Cpp17),
            "20" => Ok(CppStandard::Cpp20),
            "23" => Ok(CppStandard::Cpp23),
            _ => Err(CppStandardParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid C++ standard string.
#[derive(Debug, Clone)]
pub struct CppStandardParseError(pub String);

impl std::fmt::Display for CppStandardParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid C++ standard '{}', valid values: 98, 11, 14, 17, 20, 23 (optionally gnu-prefixed)",
            self.0
        )
    }
}

impl std::error::Error for CppStandardParseError {}

impl std::fmt::Display for CppStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C++{}", self.as_number())
    }
}
