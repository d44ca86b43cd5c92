//! Implementation of `stevedore generate`.
//!
//! Writes everything the native build reads before configure: the
//! toolchain and dependency wiring, the license tree and report, and the
//! FMI shim seed.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::context::BuildLayout;
use crate::builder::deps::DependencyInfo;
use crate::builder::licenses::{self, LicenseFormat, LicenseManifest};
use crate::builder::toolchain::ToolchainConfig;
use crate::ops::evaluate::Evaluation;
use crate::resolver::requirements::FMI_SHIM;
use crate::util::fs::copy_file;

/// The FMI entry points the shim package ships as source.
pub const SHIM_SOURCE: &str = "fmi_functions.cpp";

/// Options for the generate step.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Externally resolved dependencies
    pub deps: Vec<DependencyInfo>,

    /// Build folder override (None = config, then `build/<type>`)
    pub build_folder: Option<PathBuf>,

    /// License report layout override
    pub license_format: Option<LicenseFormat>,
}

/// What the generate step produced.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub layout: BuildLayout,
    pub toolchain: ToolchainConfig,
    pub licenses: LicenseManifest,
    pub shim_seed: Option<PathBuf>,
}

/// Pick the build folder: explicit override, then config, then default.
pub fn build_layout(eval: &Evaluation, build_folder: Option<&Path>) -> BuildLayout {
    let layout = BuildLayout::new(eval.recipe.root(), eval.settings.build_type);
    match build_folder.or(eval.config.build.build_folder.as_deref()) {
        Some(folder) => layout.with_build_folder(folder),
        None => layout,
    }
}

/// Run the generator stage.
pub fn generate(eval: &Evaluation, opts: &GenerateOptions) -> Result<GenerateReport> {
    let identity = eval.recipe.identity();
    let layout = build_layout(eval, opts.build_folder.as_deref());
    tracing::info!("generating into {}", layout.build_folder().display());

    let toolchain = ToolchainConfig::new(identity.name(), &eval.options, &eval.settings, eval.with_tests);
    toolchain.write(&layout, &opts.deps)?;

    let manifest = licenses::aggregate(identity, &layout, &opts.deps)?;
    let format = opts
        .license_format
        .or(eval.config.build.license_format)
        .unwrap_or_default();
    licenses::write_report(&manifest, &layout, format, eval.options.with_doc())?;

    let shim_seed = seed_shim(&layout, &opts.deps)?;

    Ok(GenerateReport {
        layout,
        toolchain,
        licenses: manifest,
        shim_seed,
    })
}

/// Copy the shim's FMI sources into `<build>/cppfmu/`.
///
/// Only a host dependency counts. Returns the copied file, or `None` when
/// the shim is absent, exports no source directory or the source file is
/// missing.
pub fn seed_shim(layout: &BuildLayout, deps: &[DependencyInfo]) -> Result<Option<PathBuf>> {
    let Some(shim) = deps
        .iter()
        .filter(|d| d.is_host())
        .find(|d| d.name.as_str() == FMI_SHIM.name)
    else {
        return Ok(None);
    };
    let Some(src_dir) = shim.src_dirs.first() else {
        tracing::debug!("`{}` exports no source directories", shim.name);
        return Ok(None);
    };

    let source = if src_dir.is_absolute() {
        src_dir.join(SHIM_SOURCE)
    } else {
        shim.package_folder.join(src_dir).join(SHIM_SOURCE)
    };
    if !source.is_file() {
        tracing::warn!("{} not found, skipping shim seed", source.display());
        return Ok(None);
    }

    let target = layout.build_folder().join(FMI_SHIM.name).join(SHIM_SOURCE);
    copy_file(&source, &target)?;
    tracing::debug!("seeded {}", target.display());
    Ok(Some(target))
}
