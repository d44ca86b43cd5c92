//! CMake driver.

use std::path::PathBuf;

use anyhow::{bail, Result};
use semver::{Version, VersionReq};

use crate::builder::backend::{Availability, BuildSystem};
use crate::builder::context::BuildLayout;
use crate::core::settings::BuildType;
use crate::util::process::{find_cmake, ProcessBuilder};

/// The range the recipe declares for its `cmake` build tool.
pub const CMAKE_VERSION_REQ: &str = ">=3.18.0, <4";

const CMAKE_CACHE: &str = "CMakeCache.txt";

/// Drives `cmake` for one recipe root and build folder.
#[derive(Debug, Clone)]
pub struct CMakeBuildSystem {
    program: PathBuf,
    layout: BuildLayout,
    build_type: BuildType,
    jobs: Option<usize>,
}

impl CMakeBuildSystem {
    /// Use the `cmake` found on PATH (or in `$CMAKE`).
    pub fn new(layout: BuildLayout, build_type: BuildType) -> Result<Self> {
        let Some(program) = find_cmake() else {
            bail!(
                "CMake not found\n\
                 \n\
                 {}",
                install_hint()
            );
        };
        Ok(Self::with_program(program, layout, build_type))
    }

    /// Use a specific `cmake` executable.
    pub fn with_program(program: impl Into<PathBuf>, layout: BuildLayout, build_type: BuildType) -> Self {
        CMakeBuildSystem {
            program: program.into(),
            layout,
            build_type,
            jobs: None,
        }
    }

    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Check the executable's version against `CMAKE_VERSION_REQ`.
    pub fn availability(&self) -> Availability {
        let version = ProcessBuilder::new(&self.program)
            .arg("--version")
            .exec_and_check()
            .ok()
            .and_then(|out| parse_cmake_version(&String::from_utf8_lossy(&out.stdout)));

        check_version(version)
    }

    pub fn configure_command(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .arg("-S")
            .arg(self.layout.recipe_root())
            .arg("-B")
            .arg(self.layout.build_folder())
            .arg(format!(
                "-DCMAKE_TOOLCHAIN_FILE={}",
                self.layout.toolchain_file().display()
            ))
            .arg(format!("-DCMAKE_BUILD_TYPE={}", self.build_type))
    }

    pub fn build_command(&self, target: Option<&str>) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program)
            .arg("--build")
            .arg(self.layout.build_folder())
            .arg("--config")
            .arg(self.build_type.as_str());

        if let Some(target) = target {
            cmd = cmd.arg("--target").arg(target);
        }
        if let Some(jobs) = self.jobs {
            cmd = cmd.arg("--parallel").arg(jobs.to_string());
        }
        cmd
    }

    pub fn install_command(&self, component: Option<&str>) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program)
            .arg("--install")
            .arg(self.layout.build_folder())
            .arg("--config")
            .arg(self.build_type.as_str());

        if let Some(component) = component {
            cmd = cmd.arg("--component").arg(component);
        }
        cmd.arg("--prefix").arg(self.layout.install_prefix())
    }

    /// Build the generator's test target. Visual Studio and Xcode call it
    /// `RUN_TESTS`; every other generator calls it `test`.
    pub fn test_command(&self) -> ProcessBuilder {
        let generator = configured_generator(&self.layout);
        self.build_command(Some(test_target(generator.as_deref())))
    }

    fn run(&self, what: &str, cmd: ProcessBuilder) -> Result<()> {
        let status = cmd.status()?;
        if !status.success() {
            bail!(
                "cmake {} failed with exit code {:?}",
                what,
                status.code()
            );
        }
        Ok(())
    }
}

impl BuildSystem for CMakeBuildSystem {
    fn name(&self) -> &str {
        "cmake"
    }

    fn configure(&self) -> Result<()> {
        self.run("configure", self.configure_command())
    }

    fn build(&self, target: Option<&str>) -> Result<()> {
        self.run("build", self.build_command(target))
    }

    fn install(&self, component: Option<&str>) -> Result<()> {
        self.run("install", self.install_command(component))
    }

    fn test(&self) -> Result<()> {
        self.run("test", self.test_command())
    }
}

/// Classify a detected cmake version against `CMAKE_VERSION_REQ`.
fn check_version(version: Option<Version>) -> Availability {
    let Some(version) = version else {
        return Availability::NotInstalled {
            tool: "cmake".to_string(),
            install_hint: install_hint(),
        };
    };

    match VersionReq::parse(CMAKE_VERSION_REQ) {
        Ok(required) if !required.matches(&version) => Availability::VersionUnsupported {
            found: version,
            required,
        },
        _ => Availability::Available { version },
    }
}

/// The generator recorded in `<build>/CMakeCache.txt`, if configured.
pub fn configured_generator(layout: &BuildLayout) -> Option<String> {
    let cache = std::fs::read_to_string(layout.build_folder().join(CMAKE_CACHE)).ok()?;
    cache.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        (key.split(':').next() == Some("CMAKE_GENERATOR")).then(|| value.trim().to_string())
    })
}

/// Name of the target that runs the test suite under `generator`.
pub fn test_target(generator: Option<&str>) -> &'static str {
    match generator {
        Some(g) if g.starts_with("Visual Studio") || g == "Xcode" => "RUN_TESTS",
        _ => "test",
    }
}

/// Parse "cmake version 3.27.4" (also "3.28.0-rc2" and "-dirty" builds).
pub fn parse_cmake_version(output: &str) -> Option<Version> {
    let line = output
        .lines()
        .find_map(|l| l.trim().strip_prefix("cmake version "))?;
    let core = line.trim().split('-').next()?;
    Version::parse(core).ok()
}

fn install_hint() -> String {
    #[cfg(target_os = "linux")]
    {
        "Install CMake: apt install cmake, dnf install cmake, or https://cmake.org/download/"
            .to_string()
    }
    #[cfg(target_os = "macos")]
    {
        "Install CMake: brew install cmake or https://cmake.org/download/".to_string()
    }
    #[cfg(target_os = "windows")]
    {
        "Install CMake: winget install cmake or https://cmake.org/download/".to_string()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        "Install CMake from https://cmake.org/download/".to_string()
    }
}
