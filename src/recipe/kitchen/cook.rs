// src/recipe/kitchen/cook.rs

//! Cook: the phased execution of one recipe evaluation

use crate::error::{Error, Result};
use crate::recipe::Recipe;
use crate::recipe::cmake::{CMakeDefinitions, ConfiguredBuild, StepOutput};
use crate::recipe::package_info::{CppInfo, PACKAGE_INFO_FILE};
use crate::recipe::requirements::Requirements;
use crate::recipe::source::BUILD_SUBFOLDER;
use crate::recipe::system::{
    Apt, SysreqMode, SystemPackageTool, SystemRequirementsResult, install_system_requirements,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::Kitchen;
use super::archive::extract_archive;
use super::config::CookResult;

/// Cook phases, in the order they must run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CookPhase {
    Resolve,
    Fetch,
    Configure,
    Build,
    Package,
}

impl CookPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Fetch => "fetch",
            Self::Configure => "configure",
            Self::Build => "build",
            Self::Package => "package",
        }
    }

    /// The phase that must have completed before this one
    pub fn previous(&self) -> Option<Self> {
        match self {
            Self::Resolve => None,
            Self::Fetch => Some(Self::Resolve),
            Self::Configure => Some(Self::Fetch),
            Self::Build => Some(Self::Configure),
            Self::Package => Some(Self::Build),
        }
    }
}

/// A single cook operation
pub struct Cook<'a> {
    kitchen: &'a Kitchen,
    recipe: &'a Recipe,
    /// Scratch directory holding sources and the build tree
    work_dir: TempDir,
    /// Install prefix and final package location
    package_dir: PathBuf,
    /// Extracted and renamed sources, set by the fetch phase
    source_dir: Option<PathBuf>,
    completed: Option<CookPhase>,
    requirements: Requirements,
    system_requirements: SystemRequirementsResult,
    configured: Option<Arc<ConfiguredBuild>>,
    cpp_info: Option<CppInfo>,
    /// Build log accumulator
    pub(super) log: String,
    /// Warnings
    pub(super) warnings: Vec<String>,
}

impl<'a> Cook<'a> {
    pub(super) fn new(kitchen: &'a Kitchen, recipe: &'a Recipe, package_dir: &Path) -> Result<Self> {
        let config = &kitchen.config;

        let work_dir = match &config.build_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                tempfile::Builder::new()
                    .prefix("osg-recipe-")
                    .keep(true)
                    .tempdir_in(dir)
            }
            None => tempfile::Builder::new()
                .prefix("osg-recipe-")
                .keep(config.keep_builddir)
                .tempdir(),
        }
        .map_err(|e| Error::IoError(format!("Failed to create build directory: {}", e)))?;

        debug!("Build directory: {}", work_dir.path().display());

        Ok(Self {
            kitchen,
            recipe,
            work_dir,
            package_dir: package_dir.to_path_buf(),
            source_dir: None,
            completed: None,
            requirements: Requirements::new(),
            system_requirements: SystemRequirementsResult::default(),
            configured: None,
            cpp_info: None,
            log: String::new(),
            warnings: Vec::new(),
        })
    }

    /// The last phase that completed
    pub fn completed(&self) -> Option<CookPhase> {
        self.completed
    }

    /// Scratch directory of this cook
    pub fn work_dir(&self) -> &Path {
        self.work_dir.path()
    }

    /// Renamed source directory, once fetched
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    fn enter(&self, phase: CookPhase) -> Result<()> {
        if self.completed.is_some_and(|done| done >= phase) {
            return Err(Error::PhaseRepeated(phase.as_str()));
        }
        if let Some(required) = phase.previous()
            && self.completed != Some(required)
        {
            return Err(Error::PhaseOrder {
                requested: phase.as_str(),
                required: required.as_str(),
            });
        }
        self.log_phase(phase);
        Ok(())
    }

    fn log_phase(&self, phase: CookPhase) {
        info!("{}: {}", self.recipe.reference(), phase.as_str());
    }

    /// Phase 1: resolve requirements and system packages
    pub fn resolve(&mut self) -> Result<()> {
        self.enter(CookPhase::Resolve)?;
        self.log_line("=== resolve ===");

        let requirements = self.recipe.requirements()?;
        for requirement in requirements.iter() {
            self.log_line(&format!("requires {}", requirement));
        }
        self.requirements = requirements;

        let mode = self.kitchen.config.sysreq_mode;
        let host_is_linux = self.kitchen.host_is_linux;
        let detected;
        let tool: Option<&dyn SystemPackageTool> = match &self.kitchen.package_tool {
            Some(tool) => Some(tool.as_ref()),
            None if self.kitchen.detect_package_tool
                && host_is_linux
                && mode != SysreqMode::Disabled =>
            {
                detected = Apt::detect();
                detected.as_ref().map(|apt| apt as &dyn SystemPackageTool)
            }
            None => None,
        };

        let result =
            install_system_requirements(self.recipe.system_packages(), mode, host_is_linux, tool);

        if let Some(reason) = &result.skipped {
            self.log_line(&format!("system requirements skipped: {}", reason));
        }
        if !result.missing.is_empty() {
            self.warnings.push(format!(
                "Missing system packages: {}",
                result.missing.join(", ")
            ));
        }
        if !result.failed.is_empty() {
            self.warnings.push(format!(
                "Failed to install system packages: {}",
                result.failed.join(", ")
            ));
        }
        self.system_requirements = result;

        self.completed = Some(CookPhase::Resolve);
        Ok(())
    }

    /// Phase 2: fetch, verify and unpack the source archive
    pub fn fetch(&mut self) -> Result<()> {
        self.enter(CookPhase::Fetch)?;
        self.log_line("=== fetch ===");

        let recipe = self.recipe;
        let source = &recipe.source;
        let archive_path = self.kitchen.fetch_source(source)?;
        self.log_line(&format!("Fetched source: {}", source.url));

        // The cache key has no extension; extraction dispatches on the name
        let local_archive = self.work_dir.path().join(source.archive_filename());
        fs::copy(&archive_path, &local_archive)?;

        extract_archive(&local_archive, self.work_dir.path())?;
        fs::remove_file(&local_archive)?;

        let extracted = self.work_dir.path().join(&source.extracted_dir);
        if !extracted.is_dir() {
            return Err(Error::NotFound(format!(
                "Archive did not contain {}",
                source.extracted_dir
            )));
        }

        let source_dir = self.work_dir.path().join(&source.subfolder);
        fs::rename(&extracted, &source_dir)?;
        self.log_line(&format!(
            "Extracted {} to {}",
            source.extracted_dir,
            source_dir.display()
        ));

        self.source_dir = Some(source_dir);
        self.completed = Some(CookPhase::Fetch);
        Ok(())
    }

    /// Phase 3: configure the build tree
    ///
    /// Runs the build tool's configure step once; later calls return the
    /// same configuration without reconfiguring.
    pub fn configure(&mut self) -> Result<Arc<ConfiguredBuild>> {
        if let Some(configured) = &self.configured {
            debug!("Reusing cached build configuration");
            return Ok(Arc::clone(configured));
        }

        self.enter(CookPhase::Configure)?;
        self.log_line("=== configure ===");

        let source_dir = self
            .source_dir
            .clone()
            .ok_or_else(|| Error::NotFound("source directory".to_string()))?;
        let build_dir = self.work_dir.path().join(BUILD_SUBFOLDER);
        fs::create_dir_all(&build_dir)?;

        let mut definitions = CMakeDefinitions::helper_defaults(
            &self.recipe.options,
            &self.recipe.settings,
            &self.package_dir,
        );
        definitions.extend(self.recipe.cmake_definitions()?);

        let build = ConfiguredBuild {
            source_dir,
            build_dir,
            install_prefix: self.package_dir.clone(),
            definitions,
        };

        let output = self.kitchen.build_tool.configure(&build)?;
        self.log_build_output("configure", &output);

        let configured = Arc::new(build);
        self.configured = Some(Arc::clone(&configured));
        self.completed = Some(CookPhase::Configure);
        Ok(configured)
    }

    fn configured(&self) -> Result<Arc<ConfiguredBuild>> {
        self.configured.clone().ok_or(Error::PhaseOrder {
            requested: CookPhase::Build.as_str(),
            required: CookPhase::Configure.as_str(),
        })
    }

    /// Phase 4: compile with the cached configuration
    pub fn build(&mut self) -> Result<()> {
        self.enter(CookPhase::Build)?;
        self.log_line("=== build ===");

        let configured = self.configured()?;
        let output = self
            .kitchen
            .build_tool
            .build(&configured, self.kitchen.config.jobs)?;
        self.log_build_output("build", &output);

        self.completed = Some(CookPhase::Build);
        Ok(())
    }

    /// Phase 5: copy the license, install, and write consumer metadata
    pub fn package(&mut self) -> Result<()> {
        self.enter(CookPhase::Package)?;
        self.log_line("=== package ===");

        fs::create_dir_all(&self.package_dir)?;
        self.copy_licenses()?;

        let configured = self.configured()?;
        let output = self.kitchen.build_tool.install(&configured)?;
        self.log_build_output("install", &output);

        let cpp_info = self.recipe.package_info(&self.package_dir)?;
        if cpp_info.libs.is_empty() {
            self.warnings
                .push("No libraries found in the package".to_string());
        }
        self.write_package_info(&cpp_info)?;
        self.log_line(&format!("Libraries: {}", cpp_info.libs.join(", ")));

        self.cpp_info = Some(cpp_info);
        self.completed = Some(CookPhase::Package);
        Ok(())
    }

    /// Consume a packaged cook into its result
    pub fn finish(self) -> Result<CookResult> {
        let cpp_info = match (self.completed, self.cpp_info) {
            (Some(CookPhase::Package), Some(info)) => info,
            _ => {
                return Err(Error::PhaseOrder {
                    requested: "finish",
                    required: CookPhase::Package.as_str(),
                });
            }
        };

        let definitions = self
            .configured
            .map(|c| c.definitions.clone())
            .unwrap_or_default();

        let build_dir = if self.kitchen.config.keep_builddir || self.kitchen.config.build_dir.is_some() {
            let path = self.work_dir.path().to_path_buf();
            info!("Keeping build directory: {}", path.display());
            Some(path)
        } else {
            None
        };

        Ok(CookResult {
            package_dir: self.package_dir,
            requirements: self.requirements.into_vec(),
            definitions,
            cpp_info,
            system_requirements: self.system_requirements,
            build_dir,
            log: self.log,
            warnings: self.warnings,
        })
    }

    fn copy_licenses(&mut self) -> Result<()> {
        let source_dir = self
            .source_dir
            .clone()
            .ok_or_else(|| Error::NotFound("source directory".to_string()))?;
        let licenses_dir = self.package_dir.join("licenses");
        fs::create_dir_all(&licenses_dir)?;

        let pattern = source_dir.join("LICENSE*");
        let pattern = pattern.to_string_lossy();
        let paths = glob::glob(&pattern)
            .map_err(|e| Error::ParseError(format!("Invalid license pattern: {}", e)))?;

        let mut copied = 0;
        for path in paths.flatten() {
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name() else {
                continue;
            };
            fs::copy(&path, licenses_dir.join(name))?;
            self.log_line(&format!("Copied license {}", path.display()));
            copied += 1;
        }

        if copied == 0 {
            warn!("No license file found in {}", source_dir.display());
            self.warnings
                .push("No license file found in the sources".to_string());
        }
        Ok(())
    }

    fn write_package_info(&self, cpp_info: &CppInfo) -> Result<()> {
        let options: BTreeMap<&str, bool> = self.recipe.options.iter().collect();
        let document = serde_json::json!({
            "name": self.recipe.name,
            "version": self.recipe.version,
            "settings": self.recipe.settings,
            "options": options,
            "cpp_info": cpp_info,
        });

        let content = serde_json::to_string_pretty(&document)
            .map_err(|e| Error::IoError(format!("Failed to serialize package info: {}", e)))?;
        fs::write(self.package_dir.join(PACKAGE_INFO_FILE), content)?;
        Ok(())
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    fn log_build_output(&mut self, step: &str, output: &StepOutput) {
        self.log_line(&format!("--- {} ---", step));
        if !output.stdout.is_empty() {
            self.log.push_str(&output.stdout);
            if !output.stdout.ends_with('\n') {
                self.log.push('\n');
            }
        }
        if !output.stderr.is_empty() {
            self.log_line("stderr:");
            self.log.push_str(&output.stderr);
            if !output.stderr.ends_with('\n') {
                self.log.push('\n');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        assert!(CookPhase::Resolve < CookPhase::Fetch);
        assert!(CookPhase::Build < CookPhase::Package);
        assert_eq!(CookPhase::Resolve.previous(), None);
        assert_eq!(CookPhase::Package.previous(), Some(CookPhase::Build));
        assert_eq!(CookPhase::Configure.as_str(), "configure");
    }
}
