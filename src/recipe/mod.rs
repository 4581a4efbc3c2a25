// src/recipe/mod.rs

//! The OpenSceneGraph package recipe
//!
//! A [`Recipe`] is evaluated for one set of settings and options. The
//! [`Kitchen`] then cooks it into a package directory: headers, libraries,
//! the license and consumer metadata.
//!
//! # Culinary Terminology
//!
//! - **Recipe**: what to build and how to configure it
//! - **Kitchen**: the executor holding caches and external tools
//! - **Cook**: one evaluation, run as strictly ordered phases
//! - **Ingredients**: the verified source archive
//!
//! # Phases
//!
//! Resolve → Fetch → Configure → Build → Package. Each phase requires the
//! previous one; a failed fetch or build aborts the cook. Installing
//! system packages is best effort.

pub mod cmake;
mod kitchen;
pub mod package_info;
pub mod profile;
pub mod requirements;
pub mod source;
pub mod system;

pub use cmake::{BuildTool, CMake, CMakeDefinitions, ConfiguredBuild, Definition, StepOutput};
pub use kitchen::{
    Cook, CookPhase, CookResult, HttpFetcher, Kitchen, KitchenConfig, SourceFetcher,
    extract_archive, verify_file_checksum,
};
pub use package_info::{CppInfo, PACKAGE_INFO_FILE, collect_libs};
pub use profile::Profile;
pub use requirements::{Requirement, Requirements};
pub use source::SourceDescriptor;
pub use system::{
    Apt, SYSTEM_PACKAGES, SysreqMode, SystemPackageTool, SystemRequirementsResult,
    install_system_requirements,
};

use crate::error::Result;
use crate::options::{OptionDef, OptionSet};
use crate::settings::Settings;
use std::path::Path;
use tracing::debug;

pub const NAME: &str = "openscenegraph";
pub const VERSION: &str = "3.6.5";
pub const DESCRIPTION: &str =
    "OpenSceneGraph is an open source high performance 3D graphics toolkit";
pub const HOMEPAGE: &str = "https://github.com/openscenegraph/OpenSceneGraph";
pub const URL: &str = "https://github.com/bincrafters/conan-openscenegraph";
pub const LICENSE: &str = "MIT";
pub const TOPICS: &[&str] = &["openscenegraph", "graphics"];

/// Options the recipe declares, with their defaults
pub const OPTION_DEFS: &[OptionDef] = &[
    OptionDef::new("shared", false),
    OptionDef::new("fPIC", true),
    OptionDef::new("build_osg_applications", false),
    OptionDef::new("build_osg_plugins_by_default", false),
    OptionDef::new("build_osg_examples", false),
    OptionDef::new("dynamic_openthreads", true),
];

/// One evaluation of the recipe
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub version: String,
    pub description: String,
    pub homepage: String,
    pub url: String,
    pub license: String,
    pub topics: Vec<String>,
    pub settings: Settings,
    pub options: OptionSet,
    /// Where the source comes from; replaceable for local mirrors
    pub source: SourceDescriptor,
}

impl Recipe {
    /// Evaluate the recipe for `settings` with default option values
    pub fn new(settings: Settings) -> Self {
        let mut recipe = Self {
            name: NAME.to_string(),
            version: VERSION.to_string(),
            description: DESCRIPTION.to_string(),
            homepage: HOMEPAGE.to_string(),
            url: URL.to_string(),
            license: LICENSE.to_string(),
            topics: TOPICS.iter().map(|t| t.to_string()).collect(),
            source: SourceDescriptor::for_release(HOMEPAGE, VERSION),
            options: OptionSet::from_defs(OPTION_DEFS),
            settings,
        };
        recipe.config_options();
        recipe
    }

    /// Evaluate the recipe and apply `name=value` option overrides
    pub fn with_overrides<S: AsRef<str>>(settings: Settings, overrides: &[S]) -> Result<Self> {
        let mut recipe = Self::new(settings);
        recipe.options.apply_all(overrides)?;
        Ok(recipe)
    }

    /// Narrow the option domain for the target platform
    fn config_options(&mut self) {
        if self.settings.is_windows() && self.options.remove("fPIC").is_some() {
            debug!("Removed option fPIC for {}", self.settings.os);
        }
    }

    /// Package reference, e.g. `openscenegraph/3.6.5`
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }

    /// Dependencies for the target platform
    pub fn requirements(&self) -> Result<Requirements> {
        requirements::resolve(&self.settings)
    }

    /// The recipe's own CMake definitions
    pub fn cmake_definitions(&self) -> Result<CMakeDefinitions> {
        CMakeDefinitions::for_recipe(&self.options, &self.settings)
    }

    /// Consumer metadata for a cooked package directory
    pub fn package_info(&self, package_dir: &Path) -> Result<CppInfo> {
        CppInfo::for_package(package_dir, &self.settings, &self.options)
    }

    /// Distribution packages needed on a Linux host
    pub fn system_packages(&self) -> &'static [&'static str] {
        SYSTEM_PACKAGES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::settings::Os;

    #[test]
    fn test_metadata() {
        let recipe = Recipe::new(Settings::for_os(Os::Linux));
        assert_eq!(recipe.reference(), "openscenegraph/3.6.5");
        assert_eq!(recipe.license, "MIT");
        assert_eq!(recipe.topics, vec!["openscenegraph", "graphics"]);
        assert_eq!(recipe.source, SourceDescriptor::for_release(HOMEPAGE, VERSION));
    }

    #[test]
    fn test_default_options() {
        let recipe = Recipe::new(Settings::for_os(Os::Linux));
        assert_eq!(recipe.options.get("shared"), Some(false));
        assert_eq!(recipe.options.get("fPIC"), Some(true));
        assert_eq!(recipe.options.get("build_osg_applications"), Some(false));
        assert_eq!(recipe.options.get("build_osg_plugins_by_default"), Some(false));
        assert_eq!(recipe.options.get("build_osg_examples"), Some(false));
        assert_eq!(recipe.options.get("dynamic_openthreads"), Some(true));
        assert_eq!(recipe.options.len(), 6);
    }

    #[test]
    fn test_fpic_removed_on_windows() {
        let recipe = Recipe::new(Settings::for_os(Os::Windows));
        assert!(!recipe.options.contains("fPIC"));
        assert!(recipe.options.is_removed("fPIC"));
        assert!(matches!(
            recipe.options.require("fPIC"),
            Err(Error::OptionNotDefined(_))
        ));
    }

    #[test]
    fn test_fpic_override_on_windows_is_ignored() {
        let recipe = Recipe::with_overrides(Settings::for_os(Os::Windows), &["fPIC=False"]).unwrap();
        assert!(!recipe.options.contains("fPIC"));
    }

    #[test]
    fn test_overrides() {
        let recipe = Recipe::with_overrides(
            Settings::for_os(Os::Linux),
            &["shared=True", "openscenegraph:build_osg_examples=yes"],
        )
        .unwrap();
        assert_eq!(recipe.options.get("shared"), Some(true));
        assert_eq!(recipe.options.get("build_osg_examples"), Some(true));

        assert!(Recipe::with_overrides(Settings::for_os(Os::Linux), &["with_qt=True"]).is_err());
        assert!(Recipe::with_overrides(Settings::for_os(Os::Linux), &["shared=maybe"]).is_err());
    }
}
