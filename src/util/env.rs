//! Scoped process-environment overrides.
//!
//! The native test runner reads its configuration from the environment, so
//! the test phase sets a few variables for its duration. `EnvOverride`
//! records the previous value of every key it touches and puts them back
//! when dropped, including on early return and unwinding.

use std::collections::BTreeMap;
use std::ffi::OsString;

/// RAII guard over a set of environment variables.
///
/// `Some(value)` sets a variable, `None` removes it. Not thread-safe: the
/// process environment is global, so callers must not run two guards
/// concurrently.
#[derive(Debug)]
#[must_use = "the override is reverted as soon as the guard is dropped"]
pub struct EnvOverride {
    saved: Vec<(String, Option<OsString>)>,
}

impl EnvOverride {
    /// Apply `overrides` to the process environment.
    pub fn apply(overrides: &BTreeMap<String, Option<String>>) -> Self {
        let mut saved = Vec::with_capacity(overrides.len());

        for (key, value) in overrides {
            saved.push((key.clone(), std::env::var_os(key)));
            match value {
                Some(value) => {
                    tracing::debug!("env {}={}", key, value);
                    std::env::set_var(key, value);
                }
                None => {
                    tracing::debug!("env -u {}", key);
                    std::env::remove_var(key);
                }
            }
        }

        EnvOverride { saved }
    }

    /// Keys this guard will restore.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.saved.iter().map(|(k, _)| k.as_str())
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        // Reverse order so a key listed twice ends at its original value.
        for (key, previous) in self.saved.drain(..).rev() {
            match previous {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}
