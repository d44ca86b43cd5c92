//! Collect built FMUs for CI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::errors::RecipeError;
use crate::hooks::{prepare_destination, Hook, HookContext};
use crate::util::fs::{normalize_path, relative_path};

pub const FMU_ARTIFACTS_HOOK: &str = "fmu-artifacts";

const DESTINATION_DIR: &str = "fmus";
const DEFAULT_MAX_DEPTH: usize = 32;
const DEFAULT_MAX_ENTRIES: usize = 100_000;

/// Copies every `.fmu` in the build tree to `fmus/`.
#[derive(Debug, Clone)]
pub struct FmuArtifactHook {
    max_depth: usize,
    max_entries: usize,
}

impl Default for FmuArtifactHook {
    fn default() -> Self {
        FmuArtifactHook {
            max_depth: DEFAULT_MAX_DEPTH,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl FmuArtifactHook {
    pub fn with_limits(max_depth: usize, max_entries: usize) -> Self {
        FmuArtifactHook {
            max_depth,
            max_entries,
        }
    }

    /// Copy FMUs under `build_folder` flat into `destination`.
    ///
    /// Returns the copied destination paths in walk order. Files already
    /// under `destination` are left alone.
    pub fn collect(&self, build_folder: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
        let dest_root = normalize_path(destination);
        let mut copied = Vec::new();
        let mut visited = 0usize;

        let walker = WalkDir::new(build_folder)
            .max_depth(self.max_depth)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            visited += 1;
            if visited > self.max_entries {
                return Err(RecipeError::HookSideEffectFailure {
                    hook: FMU_ARTIFACTS_HOOK.to_string(),
                    message: format!(
                        "build tree {} has more than {} entries",
                        build_folder.display(),
                        self.max_entries
                    ),
                }
                .into());
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_fmu(entry.path()) {
                continue;
            }
            if normalize_path(entry.path()).starts_with(&dest_root) {
                debug!("{} is already in the destination", entry.path().display());
                continue;
            }

            let target = destination.join(entry.file_name());
            std::fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
            info!(
                "copied {} to {}",
                relative_path(build_folder, entry.path()).display(),
                destination.display()
            );
            copied.push(target);
        }

        Ok(copied)
    }
}

impl Hook for FmuArtifactHook {
    fn id(&self) -> &'static str {
        FMU_ARTIFACTS_HOOK
    }

    fn pre_build(&self, ctx: &HookContext) -> Result<Option<PathBuf>> {
        let destination = ctx.ci_directory(DESTINATION_DIR);
        prepare_destination(FMU_ARTIFACTS_HOOK, &destination)?;
        info!("FMUs will be collected in {}", destination.display());
        Ok(Some(destination))
    }

    fn post_build(&self, ctx: &HookContext, destination: &Path) -> Result<()> {
        let copied = self.collect(ctx.build_folder(), destination)?;
        if copied.is_empty() {
            warn!("no FMUs found under {}", ctx.build_folder().display());
        }
        Ok(())
    }
}

fn is_fmu(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("fmu"))
        .unwrap_or(false)
}
