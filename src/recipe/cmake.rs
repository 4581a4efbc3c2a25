// src/recipe/cmake.rs

//! CMake flag mapping and build tool driver
//!
//! [`CMakeDefinitions`] is the derived mapping from recipe options and
//! settings to `-D` definitions. The [`BuildTool`] trait is the seam between
//! the cook phases and the external build system; [`CMake`] is the real
//! implementation and runs the `cmake` executable.

use crate::error::{Error, Result};
use crate::options::OptionSet;
use crate::settings::Settings;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A single CMake definition value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Definition {
    Bool(bool),
    Str(String),
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => write!(f, "ON"),
            Self::Bool(false) => write!(f, "OFF"),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Definition {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Definition {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Definition {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Ordered mapping of CMake definitions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CMakeDefinitions {
    defs: BTreeMap<String, Definition>,
}

impl CMakeDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recipe's own flag mapping
    ///
    /// Five boolean options plus, for Visual Studio only, the static CRT
    /// switch derived from the compiler runtime.
    pub fn for_recipe(options: &OptionSet, settings: &Settings) -> Result<Self> {
        let mut defs = Self::new();

        defs.set(
            "BUILD_OSG_APPLICATIONS",
            options.require("build_osg_applications")?,
        );
        defs.set("DYNAMIC_OPENSCENEGRAPH", options.require("shared")?);
        defs.set(
            "BUILD_OSG_PLUGINS_BY_DEFAULT",
            options.require("build_osg_plugins_by_default")?,
        );
        defs.set("BUILD_OSG_EXAMPLES", options.require("build_osg_examples")?);
        defs.set("DYNAMIC_OPENTHREADS", options.require("dynamic_openthreads")?);

        if settings.compiler.is_visual_studio() {
            let static_crt = settings
                .compiler
                .runtime
                .is_some_and(|runtime| runtime.is_static());
            defs.set("BUILD_WITH_STATIC_CRT", static_crt);
        }

        Ok(defs)
    }

    /// Definitions the CMake helper always passes
    ///
    /// Build type, install layout under `install_prefix`, shared/static and
    /// position-independent code (only when the option exists).
    pub fn helper_defaults(options: &OptionSet, settings: &Settings, install_prefix: &Path) -> Self {
        let mut defs = Self::new();

        if let Some(build_type) = settings.build_type {
            defs.set("CMAKE_BUILD_TYPE", build_type.to_string());
        }
        defs.set(
            "CMAKE_INSTALL_PREFIX",
            install_prefix.to_string_lossy().to_string(),
        );
        defs.set("CMAKE_INSTALL_LIBDIR", "lib");
        defs.set("CMAKE_INSTALL_BINDIR", "bin");
        defs.set("CMAKE_INSTALL_INCLUDEDIR", "include");

        if let Some(shared) = options.get("shared") {
            defs.set("BUILD_SHARED_LIBS", shared);
        }
        if let Some(fpic) = options.get("fPIC") {
            defs.set("CMAKE_POSITION_INDEPENDENT_CODE", fpic);
        }

        defs
    }

    /// Insert or replace a definition
    pub fn set(&mut self, name: &str, value: impl Into<Definition>) {
        self.defs.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.defs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Merge another mapping in; entries in `other` win
    pub fn extend(&mut self, other: CMakeDefinitions) {
        self.defs.extend(other.defs);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.defs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Render as `-DNAME=VALUE` arguments
    pub fn to_args(&self) -> Vec<String> {
        self.defs
            .iter()
            .map(|(name, value)| format!("-D{}={}", name, value))
            .collect()
    }
}

/// The configured state of one build, created once per cook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredBuild {
    /// Directory holding the top-level CMakeLists.txt
    pub source_dir: PathBuf,
    /// Out-of-source build directory
    pub build_dir: PathBuf,
    /// Install prefix (the package directory)
    pub install_prefix: PathBuf,
    /// Complete definitions passed at configure time
    pub definitions: CMakeDefinitions,
}

/// Output captured from a build tool step
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    pub stdout: String,
    pub stderr: String,
}

/// External build system driven by the cook phases
pub trait BuildTool: Send + Sync {
    /// Generate the build tree
    fn configure(&self, build: &ConfiguredBuild) -> Result<StepOutput>;

    /// Compile
    fn build(&self, build: &ConfiguredBuild, jobs: u32) -> Result<StepOutput>;

    /// Install into the configured prefix
    fn install(&self, build: &ConfiguredBuild) -> Result<StepOutput>;
}

/// The `cmake` command line driver
#[derive(Debug, Clone)]
pub struct CMake {
    program: PathBuf,
    generator: Option<String>,
}

impl Default for CMake {
    fn default() -> Self {
        Self::new("cmake")
    }
}

impl CMake {
    /// Create a driver for the given `cmake` executable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            generator: None,
        }
    }

    /// Use a specific generator (`-G`)
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = Some(generator.into());
        self
    }

    /// Arguments for the configure invocation
    pub fn configure_args(&self, build: &ConfiguredBuild) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(generator) = &self.generator {
            args.push("-G".to_string());
            args.push(generator.clone());
        }
        args.extend(build.definitions.to_args());
        args.push("-S".to_string());
        args.push(build.source_dir.to_string_lossy().to_string());
        args.push("-B".to_string());
        args.push(build.build_dir.to_string_lossy().to_string());
        args
    }

    /// Arguments for the build invocation
    pub fn build_args(&self, build: &ConfiguredBuild, jobs: u32) -> Vec<String> {
        let mut args = vec![
            "--build".to_string(),
            build.build_dir.to_string_lossy().to_string(),
        ];
        if let Some(Definition::Str(build_type)) = build.definitions.get("CMAKE_BUILD_TYPE") {
            args.push("--config".to_string());
            args.push(build_type.clone());
        }
        args.push("--parallel".to_string());
        args.push(jobs.max(1).to_string());
        args
    }

    /// Arguments for the install invocation
    pub fn install_args(&self, build: &ConfiguredBuild) -> Vec<String> {
        let mut args = vec![
            "--install".to_string(),
            build.build_dir.to_string_lossy().to_string(),
        ];
        if let Some(Definition::Str(build_type)) = build.definitions.get("CMAKE_BUILD_TYPE") {
            args.push("--config".to_string());
            args.push(build_type.clone());
        }
        args
    }

    fn run(&self, step: &str, args: &[String], workdir: &Path) -> Result<StepOutput> {
        info!("Running cmake {} step", step);
        debug!("Command: {} {}", self.program.display(), args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(workdir)
            .output()
            .map_err(|e| {
                Error::InitError(format!(
                    "Failed to run {} for {} step: {}",
                    self.program.display(),
                    step,
                    e
                ))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(Error::BuildFailed {
                step: step.to_string(),
                code: output.status.code(),
                stderr,
            });
        }

        Ok(StepOutput { stdout, stderr })
    }
}

impl BuildTool for CMake {
    fn configure(&self, build: &ConfiguredBuild) -> Result<StepOutput> {
        std::fs::create_dir_all(&build.build_dir)?;
        self.run("configure", &self.configure_args(build), &build.build_dir)
    }

    fn build(&self, build: &ConfiguredBuild, jobs: u32) -> Result<StepOutput> {
        self.run("build", &self.build_args(build, jobs), &build.build_dir)
    }

    fn install(&self, build: &ConfiguredBuild) -> Result<StepOutput> {
        self.run("install", &self.install_args(build), &build.build_dir)
    }
}
