//! Package identification - package names and pinned references.
//!
//! `PackageName` is the stable identifier hooks are keyed on; it is
//! validated on construction so a typo fails loudly instead of silently
//! never matching. `PackageRef` is the `name/version[@user/channel]` form
//! the external resolver consumes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;

/// Maximum length accepted for a package name.
const MAX_NAME_LEN: usize = 101;

/// A validated package name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Validate and wrap a package name.
    ///
    /// Names are lowercase ASCII: letters, digits and `_ - + .`, starting
    /// with a letter, digit or underscore.
    pub fn new(name: impl Into<String>) -> Result<Self, RecipeError> {
        let name = name.into();
        let invalid = |message: &str| RecipeError::InvalidPackageName {
            name: name.clone(),
            message: message.to_string(),
        };

        let Some(first) = name.chars().next() else {
            return Err(invalid("name is empty"));
        };
        if name.len() > MAX_NAME_LEN {
            return Err(invalid("name is longer than 101 characters"));
        }
        if !(first.is_ascii_lowercase() || first.is_ascii_digit() || first == '_') {
            return Err(invalid("name must start with a lowercase letter, digit or '_'"));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || "_-+.".contains(*c)))
        {
            return Err(invalid(&format!("character '{}' is not allowed", bad)));
        }

        Ok(PackageName(name))
    }

    /// Wrap a compile-time constant. Validity is checked in debug builds.
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(
            PackageName::new(name).is_ok(),
            "invalid static package name `{}`",
            name
        );
        PackageName(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PackageName {
    type Error = RecipeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PackageName::new(value)
    }
}

impl From<PackageName> for String {
    fn from(name: PackageName) -> Self {
        name.0
    }
}

impl FromStr for PackageName {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageName::new(s)
    }
}

/// A pinned package reference: `name/version[@user/channel]`.
///
/// The version is kept verbatim since pins include ranges
/// (`[>=3.18.0 <4]`) and non-semver tags (`cci.20230615`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageRef {
    name: PackageName,
    version: String,
    user_channel: Option<(String, String)>,
}

impl PackageRef {
    /// Create a reference without a user/channel.
    pub fn new(name: PackageName, version: impl Into<String>) -> Self {
        PackageRef {
            name,
            version: version.into(),
            user_channel: None,
        }
    }

    /// Attach a `@user/channel` qualifier.
    pub fn with_channel(mut self, user: impl Into<String>, channel: impl Into<String>) -> Self {
        self.user_channel = Some((user.into(), channel.into()));
        self
    }

    pub fn name(&self) -> &PackageName {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn user_channel(&self) -> Option<(&str, &str)> {
        self.user_channel
            .as_ref()
            .map(|(u, c)| (u.as_str(), c.as_str()))
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if let Some((user, channel)) = &self.user_channel {
            write!(f, "@{}/{}", user, channel)?;
        }
        Ok(())
    }
}

impl FromStr for PackageRef {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| RecipeError::InvalidPackageName {
            name: s.to_string(),
            message: message.to_string(),
        };

        let (pinned, user_channel) = match s.split_once('@') {
            Some((pinned, qualifier)) => {
                let (user, channel) = qualifier
                    .split_once('/')
                    .ok_or_else(|| invalid("expected `@user/channel`"))?;
                if user.is_empty() || channel.is_empty() {
                    return Err(invalid("user and channel must not be empty"));
                }
                (pinned, Some((user.to_string(), channel.to_string())))
            }
            None => (s, None),
        };

        let (name, version) = pinned
            .split_once('/')
            .ok_or_else(|| invalid("expected `name/version`"))?;
        if version.is_empty() {
            return Err(invalid("version must not be empty"));
        }

        Ok(PackageRef {
            name: PackageName::new(name)?,
            version: version.to_string(),
            user_channel,
        })
    }
}

impl TryFrom<String> for PackageRef {
    type Error = RecipeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PackageRef> for String {
    fn from(reference: PackageRef) -> Self {
        reference.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name_validation() {
        assert!(PackageName::new("dds-fmu").is_ok());
        assert!(PackageName::new("eprosima-xtypes").is_ok());
        assert!(PackageName::new("").is_err());
        assert!(PackageName::new("DDS-FMU").is_err());
        assert!(PackageName::new("-leading").is_err());
        assert!(PackageName::new("has space").is_err());
    }

    #[test]
    fn test_parse_reference_with_channel() {
        let r: PackageRef = "cppfmu/1.0.0@sintef/stable".parse().unwrap();
        assert_eq!(r.name().as_str(), "cppfmu");
        assert_eq!(r.version(), "1.0.0");
        assert_eq!(r.user_channel(), Some(("sintef", "stable")));
        assert_eq!(r.to_string(), "cppfmu/1.0.0@sintef/stable");
    }

    #[test]
    fn test_parse_reference_with_range() {
        let r: PackageRef = "cmake/[>=3.18.0 <4]".parse().unwrap();
        assert_eq!(r.version(), "[>=3.18.0 <4]");
        assert_eq!(r.user_channel(), None);
    }

    #[test]
    fn test_parse_reference_errors() {
        assert!("cmake".parse::<PackageRef>().is_err());
        assert!("cmake/".parse::<PackageRef>().is_err());
        assert!("cppfmu/1.0.0@sintef".parse::<PackageRef>().is_err());
    }
}
