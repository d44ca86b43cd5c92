//! Lifecycle hooks.
//!
//! Hooks run around the native build: `pre_build` computes (and creates) a
//! destination directory, `post_build` acts on it once the build tree is
//! complete. Hooks are registered per package name and only fire when the
//! recipe being built has exactly that name.
//!
//! The destination a hook computes is stored in the `HookContext` and
//! handed back to the same hook after the build, so nothing is carried in
//! hidden state between the two calls.

pub mod artifacts;
pub mod test_results;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::errors::RecipeError;
use crate::core::manifest::PackageIdentity;
use crate::core::package_id::PackageName;
use crate::util::diagnostic::recipe_error;
use crate::util::fs::ensure_dir;

pub use artifacts::FmuArtifactHook;
pub use test_results::TestResultsHook;

/// Environment variable CI runners use for the checkout directory.
pub const CI_PROJECT_DIR: &str = "CI_PROJECT_DIR";

/// Recipe name the built-in hooks are registered for.
pub const DEFAULT_HOOK_TARGET: &str = "dds-fmu";

/// State shared by all hooks during one build.
#[derive(Debug, Clone)]
pub struct HookContext {
    identity: PackageIdentity,
    recipe_root: PathBuf,
    build_folder: PathBuf,
    env: BTreeMap<String, Option<String>>,
    destinations: BTreeMap<String, PathBuf>,
}

impl HookContext {
    pub fn new(
        identity: PackageIdentity,
        recipe_root: impl Into<PathBuf>,
        build_folder: impl Into<PathBuf>,
    ) -> Self {
        HookContext {
            identity,
            recipe_root: recipe_root.into(),
            build_folder: build_folder.into(),
            env: BTreeMap::new(),
            destinations: BTreeMap::new(),
        }
    }

    pub fn identity(&self) -> &PackageIdentity {
        &self.identity
    }

    pub fn recipe_root(&self) -> &Path {
        &self.recipe_root
    }

    pub fn build_folder(&self) -> &Path {
        &self.build_folder
    }

    /// Override an environment variable as seen by hooks. `None` hides a
    /// variable that is set in the process environment.
    pub fn set_env(&mut self, key: impl Into<String>, value: Option<String>) {
        self.env.insert(key.into(), value);
    }

    /// Look up a variable, overrides first. Empty values count as unset.
    pub fn env_var(&self, key: &str) -> Option<String> {
        let value = match self.env.get(key) {
            Some(value) => value.clone(),
            None => std::env::var(key).ok(),
        };
        value.filter(|v| !v.is_empty())
    }

    pub fn env_overrides(&self) -> &BTreeMap<String, Option<String>> {
        &self.env
    }

    /// Record the destination computed by `hook`. Each hook gets exactly one.
    pub fn set_destination(&mut self, hook: &str, path: PathBuf) -> Result<(), RecipeError> {
        if let Some(existing) = self.destinations.get(hook) {
            return Err(RecipeError::HookSideEffectFailure {
                hook: hook.to_string(),
                message: format!(
                    "destination already set to {}",
                    existing.display()
                ),
            });
        }
        self.destinations.insert(hook.to_string(), path);
        Ok(())
    }

    pub fn destination(&self, hook: &str) -> Option<&Path> {
        self.destinations.get(hook).map(PathBuf::as_path)
    }

    /// `$CI_PROJECT_DIR/<subdir>`, or `<recipe_root>/<subdir>` outside CI.
    pub fn ci_directory(&self, subdir: &str) -> PathBuf {
        match self.env_var(CI_PROJECT_DIR) {
            Some(ci_root) => PathBuf::from(ci_root).join(subdir),
            None => self.recipe_root.join(subdir),
        }
    }
}

/// A build lifecycle hook.
pub trait Hook {
    /// Stable identifier; also the key of the hook's destination.
    fn id(&self) -> &'static str;

    /// Compute and prepare the destination. Called before configure.
    fn pre_build(&self, ctx: &HookContext) -> Result<Option<PathBuf>>;

    /// Act on the finished build tree. Called only if `pre_build` returned
    /// a destination.
    fn post_build(&self, ctx: &HookContext, destination: &Path) -> Result<()>;
}

/// Create a hook destination directory. Safe to call repeatedly.
pub fn prepare_destination(hook: &str, path: &Path) -> Result<()> {
    ensure_dir(path).map_err(|e| {
        anyhow::Error::new(RecipeError::HookSideEffectFailure {
            hook: hook.to_string(),
            message: format!("{:#}", e),
        })
    })
}

/// Hooks keyed by the package they apply to.
#[derive(Default)]
pub struct HookRegistry {
    entries: Vec<(PackageName, Box<dyn Hook>)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        HookRegistry::default()
    }

    /// The FMU artifact and test-results hooks, registered for `dds-fmu`.
    pub fn with_defaults() -> Self {
        let target = PackageName::from_static(DEFAULT_HOOK_TARGET);
        let artifacts: Box<dyn Hook> = Box::new(FmuArtifactHook::default());
        let test_results: Box<dyn Hook> = Box::new(TestResultsHook);
        HookRegistry {
            entries: vec![(target.clone(), artifacts), (target, test_results)],
        }
    }

    pub fn register(&mut self, package: PackageName, hook: Box<dyn Hook>) -> Result<(), RecipeError> {
        if self
            .entries
            .iter()
            .any(|(name, existing)| name == &package && existing.id() == hook.id())
        {
            return Err(RecipeError::DuplicateHook {
                hook: hook.id().to_string(),
                package: package.to_string(),
            });
        }
        self.entries.push((package, hook));
        Ok(())
    }

    /// Register by name, validating it first.
    pub fn register_for(&mut self, package: &str, hook: Box<dyn Hook>) -> Result<(), RecipeError> {
        self.register(PackageName::new(package)?, hook)
    }

    /// Hooks registered for `package`, in registration order.
    pub fn hooks_for<'a>(&'a self, package: &'a PackageName) -> impl Iterator<Item = &'a dyn Hook> + 'a {
        self.entries
            .iter()
            .filter(move |(name, _)| name == package)
            .map(|(_, hook)| hook.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run `pre_build` for every matching hook and record destinations.
    pub fn dispatch_pre_build(&self, ctx: &mut HookContext) -> Result<()> {
        let package = ctx.identity().name().clone();
        for hook in self.hooks_for(&package) {
            let destination = hook
                .pre_build(ctx)
                .map_err(|e| as_hook_failure(hook.id(), e))?;
            if let Some(destination) = destination {
                ctx.set_destination(hook.id(), destination)?;
            }
        }
        Ok(())
    }

    /// Run `post_build` for every matching hook with a destination.
    ///
    /// A failing hook does not stop the others; the first failure is
    /// returned after all have run.
    pub fn dispatch_post_build(&self, ctx: &HookContext) -> Result<()> {
        let mut first_error = None;

        for hook in self.hooks_for(ctx.identity().name()) {
            let Some(destination) = ctx.destination(hook.id()) else {
                continue;
            };
            if let Err(e) = hook
                .post_build(ctx, destination)
                .with_context(|| format!("post-build hook `{}`", hook.id()))
            {
                tracing::error!("{:#}", e);
                first_error.get_or_insert_with(|| as_hook_failure(hook.id(), e));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Tag an error as a hook failure unless it already carries a typed error.
fn as_hook_failure(hook: &str, err: anyhow::Error) -> anyhow::Error {
    if recipe_error(&err).is_some() {
        return err;
    }
    anyhow::Error::new(RecipeError::HookSideEffectFailure {
        hook: hook.to_string(),
        message: format!("{:#}", err),
    })
}
