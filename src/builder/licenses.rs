//! License aggregation and the license report.
//!
//! Every host dependency contributes its `licenses/` folder and one row to
//! the report. Build tools and test frameworks are not redistributed and
//! are skipped.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::builder::context::BuildLayout;
use crate::builder::deps::{DependencyInfo, License};
use crate::core::manifest::PackageIdentity;
use crate::util::fs::{copy_file, glob_files, relative_path, write_string};

const NAME_WIDTH: usize = 20;
const LICENSE_WIDTH: usize = 30;

/// File name of the plain-text report inside `<build>/licenses`.
pub const REPORT_FILE: &str = "licenses.txt";

/// Report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseFormat {
    /// Fixed-width markdown table
    #[default]
    Table,
    /// One `name: license` line per row
    List,
}

impl FromStr for LicenseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(LicenseFormat::Table),
            "list" => Ok(LicenseFormat::List),
            _ => Err(format!("unknown license format `{}` (expected table or list)", s)),
        }
    }
}

impl fmt::Display for LicenseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseFormat::Table => f.write_str("table"),
            LicenseFormat::List => f.write_str("list"),
        }
    }
}

/// Unique `(name, license)` rows: the package itself, then its host
/// dependencies in name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseManifest {
    package: (String, String),
    rows: BTreeMap<String, String>,
}

impl LicenseManifest {
    pub fn new(identity: &PackageIdentity) -> Self {
        LicenseManifest {
            package: (
                identity.name().to_string(),
                identity.license().to_string(),
            ),
            rows: BTreeMap::new(),
        }
    }

    /// Add a dependency row. The first license seen for a name is kept.
    pub fn add(&mut self, name: &str, license: &License) -> bool {
        if name == self.package.0 || self.rows.contains_key(name) {
            tracing::warn!("duplicate license entry for `{}`; keeping the first", name);
            return false;
        }
        self.rows.insert(name.to_string(), license.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        name == self.package.0 || self.rows.contains_key(name)
    }

    /// All rows, package first.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once((self.package.0.as_str(), self.package.1.as_str()))
            .chain(self.rows.iter().map(|(n, l)| (n.as_str(), l.as_str())))
    }

    /// Number of rows including the package itself.
    pub fn entry_count(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn render(&self, format: LicenseFormat) -> String {
        let mut out = format!(
            "Licenses for `{}` and its dependencies are listed below.\n\n",
            self.package.0
        );

        match format {
            LicenseFormat::Table => {
                let _ = writeln!(
                    out,
                    "| {:<nw$}| {:<lw$}|",
                    "Library",
                    "License",
                    nw = NAME_WIDTH,
                    lw = LICENSE_WIDTH
                );
                let _ = writeln!(
                    out,
                    "|{}|{}|",
                    "-".repeat(NAME_WIDTH + 1),
                    "-".repeat(LICENSE_WIDTH + 1)
                );
                for (name, license) in self.rows() {
                    let _ = writeln!(
                        out,
                        "| {:<nw$}| {:<lw$}|",
                        name,
                        license,
                        nw = NAME_WIDTH,
                        lw = LICENSE_WIDTH
                    );
                }
            }
            LicenseFormat::List => {
                for (name, license) in self.rows() {
                    let _ = writeln!(out, "{}: {}", name, license);
                }
            }
        }

        out
    }
}

/// Collect license rows and files from the dependency set.
///
/// Host dependencies have `<package_folder>/licenses/**` copied into
/// `<build>/licenses/<name>/`. The recipe's own `LICENSE` is copied to
/// `<build>/licenses/LICENSE` when present.
pub fn aggregate(
    identity: &PackageIdentity,
    layout: &BuildLayout,
    deps: &[DependencyInfo],
) -> Result<LicenseManifest> {
    let mut manifest = LicenseManifest::new(identity);
    let licenses_folder = layout.licenses_folder();

    for dep in deps.iter().filter(|d| d.is_host()) {
        if !manifest.add(dep.name.as_str(), &dep.license) {
            continue;
        }

        let source = dep.package_folder.join("licenses");
        if !source.is_dir() {
            tracing::debug!("`{}` ships no licenses folder", dep.name);
            continue;
        }

        let target = licenses_folder.join(dep.name.as_str());
        for file in glob_files(&source, "**/*")? {
            copy_file(&file, &target.join(relative_path(&source, &file)))?;
        }
    }

    let own_license = layout.recipe_root().join("LICENSE");
    if own_license.is_file() {
        copy_file(&own_license, &licenses_folder.join("LICENSE"))?;
    }

    Ok(manifest)
}

/// Write `<build>/licenses/licenses.txt`, and `<build>/gen_md/licenses.md`
/// for the documentation build.
pub fn write_report(
    manifest: &LicenseManifest,
    layout: &BuildLayout,
    format: LicenseFormat,
    with_doc: bool,
) -> Result<()> {
    let text = manifest.render(format);
    write_string(&layout.licenses_folder().join(REPORT_FILE), &text)?;

    if with_doc {
        let markdown = format!("# Licenses {{#sec_licenses}}\n{}", text);
        write_string(&layout.gen_md_folder().join("licenses.md"), &markdown)?;
    }

    tracing::info!(
        "license report with {} entries written to {}",
        manifest.entry_count(),
        display_in(layout.build_folder(), &layout.licenses_folder())
    );
    Ok(())
}

fn display_in(base: &Path, path: &Path) -> String {
    relative_path(base, path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::BuildType;
    use crate::resolver::requirements::Role;
    use crate::test_support::{dependency, identity};
    use std::fs;
    use tempfile::TempDir;

    fn sample_rows() -> Vec<(&'static str, License)> {
        vec![
            ("stduuid", "MIT".into()),
            ("fast-dds", "Apache-2.0".into()),
            ("kuba-zip", License::Multiple(vec!["Unlicense".into(), "MIT".into()])),
            ("cppfmu", "MPL-2.0".into()),
        ]
    }

    #[test]
    fn test_table_layout() {
        let mut manifest = LicenseManifest::new(&identity("dds-fmu", "0.3.0"));
        manifest.add("fast-dds", &"Apache-2.0".into());

        let expected = "Licenses for `dds-fmu` and its dependencies are listed below.\n\n\
| Library             | License                       |\n\
|---------------------|-------------------------------|\n\
| dds-fmu             | MPL-2.0                       |\n\
| fast-dds            | Apache-2.0                    |\n";
        assert_eq!(manifest.render(LicenseFormat::Table), expected);
    }

    #[test]
    fn test_long_values_overflow_without_truncation() {
        let mut manifest = LicenseManifest::new(&identity("dds-fmu", "0.3.0"));
        manifest.add("a-very-long-dependency-name", &"LicenseRef-some-custom-license-text".into());

        let text = manifest.render(LicenseFormat::Table);
        assert!(text.contains("| a-very-long-dependency-name| LicenseRef-some-custom-license-text|"));
    }

    #[test]
    fn test_list_layout_and_multiple_licenses() {
        let mut manifest = LicenseManifest::new(&identity("dds-fmu", "0.3.0"));
        for (name, license) in sample_rows() {
            manifest.add(name, &license);
        }

        let text = manifest.render(LicenseFormat::List);
        let lines: Vec<_> = text.lines().skip(2).collect();
        assert_eq!(
            lines,
            vec![
                "dds-fmu: MPL-2.0",
                "cppfmu: MPL-2.0",
                "fast-dds: Apache-2.0",
                "kuba-zip: Unlicense, MIT",
                "stduuid: MIT",
            ]
        );
    }

    #[test]
    fn test_render_is_independent_of_input_order() {
        let render = |rows: &[(&str, License)]| {
            let mut manifest = LicenseManifest::new(&identity("dds-fmu", "0.3.0"));
            for (name, license) in rows {
                manifest.add(name, license);
            }
            manifest.render(LicenseFormat::Table)
        };

        let rows = sample_rows();
        let baseline = render(&rows);
        let mut reversed = rows.clone();
        reversed.reverse();
        let mut rotated = rows.clone();
        rotated.rotate_left(2);

        assert_eq!(render(&reversed), baseline);
        assert_eq!(render(&rotated), baseline);
        assert_eq!(render(&rows), baseline);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut manifest = LicenseManifest::new(&identity("dds-fmu", "0.3.0"));
        assert!(manifest.add("fast-dds", &"Apache-2.0".into()));
        assert!(!manifest.add("fast-dds", &"MIT".into()));
        assert!(!manifest.add("dds-fmu", &"MIT".into()));

        assert_eq!(manifest.entry_count(), 2);
        assert!(manifest.render(LicenseFormat::List).contains("fast-dds: Apache-2.0"));
    }

    #[test]
    fn test_aggregate_copies_host_licenses_only() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("recipe");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("LICENSE"), "MPL").unwrap();

        let dds = tmp.path().join("pkgs/fast-dds");
        fs::create_dir_all(dds.join("licenses/third_party")).unwrap();
        fs::write(dds.join("licenses/LICENSE"), "apache").unwrap();
        fs::write(dds.join("licenses/third_party/NOTICE"), "notice").unwrap();

        let cmake = tmp.path().join("pkgs/cmake");
        fs::create_dir_all(cmake.join("licenses")).unwrap();
        fs::write(cmake.join("licenses/Copyright.txt"), "bsd").unwrap();

        let deps = vec![
            dependency("fast-dds", Role::Host, "Apache-2.0", dds.to_str().unwrap()),
            dependency("cmake", Role::BuildTool, "BSD-3-Clause", cmake.to_str().unwrap()),
            dependency("gtest", Role::Test, "BSD-3-Clause", "/nonexistent"),
        ];

        let layout = BuildLayout::new(&root, BuildType::Release);
        let manifest = aggregate(&identity("dds-fmu", "0.3.0"), &layout, &deps).unwrap();

        let licenses = layout.licenses_folder();
        assert!(licenses.join("fast-dds/LICENSE").is_file());
        assert!(licenses.join("fast-dds/third_party/NOTICE").is_file());
        assert!(!licenses.join("cmake").exists());
        assert_eq!(fs::read_to_string(licenses.join("LICENSE")).unwrap(), "MPL");
        assert!(manifest.contains("fast-dds"));
        assert!(!manifest.contains("cmake"));
        assert!(!manifest.contains("gtest"));
    }

    #[test]
    fn test_write_report_with_doc() {
        let tmp = TempDir::new().unwrap();
        let layout = BuildLayout::new(tmp.path(), BuildType::Release);
        let manifest = LicenseManifest::new(&identity("dds-fmu", "0.3.0"));

        write_report(&manifest, &layout, LicenseFormat::Table, false).unwrap();
        assert!(layout.licenses_folder().join(REPORT_FILE).is_file());
        assert!(!layout.gen_md_folder().exists());

        write_report(&manifest, &layout, LicenseFormat::Table, true).unwrap();
        let md = fs::read_to_string(layout.gen_md_folder().join("licenses.md")).unwrap();
        let txt = fs::read_to_string(layout.licenses_folder().join(REPORT_FILE)).unwrap();
        assert_eq!(md, format!("# Licenses {{#sec_licenses}}\n{}", txt));
    }
}
