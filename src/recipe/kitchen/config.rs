// src/recipe/kitchen/config.rs

//! Configuration types for the Kitchen

use crate::recipe::cmake::CMakeDefinitions;
use crate::recipe::package_info::CppInfo;
use crate::recipe::requirements::Requirement;
use crate::recipe::system::{SysreqMode, SystemRequirementsResult};
use std::path::PathBuf;
use std::time::Duration;

/// Directory name under the user cache directory
const CACHE_DIR_NAME: &str = "osg-recipe";

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Directory for downloaded sources
    pub source_cache: PathBuf,
    /// Connect/read timeout for downloads
    pub download_timeout: Duration,
    /// Number of parallel build jobs
    pub jobs: u32,
    /// How system packages are handled on Linux hosts
    pub sysreq_mode: SysreqMode,
    /// `cmake` executable
    pub cmake_program: PathBuf,
    /// CMake generator (`-G`), if not the platform default
    pub generator: Option<String>,
    /// Keep build directory after completion (for debugging)
    pub keep_builddir: bool,
    /// Use this directory instead of a temporary one
    ///
    /// An explicit build directory is never removed.
    pub build_dir: Option<PathBuf>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        let source_cache = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(CACHE_DIR_NAME)
            .join("sources");

        Self {
            source_cache,
            download_timeout: Duration::from_secs(300),
            jobs,
            sysreq_mode: SysreqMode::default(),
            cmake_program: PathBuf::from("cmake"),
            generator: None,
            keep_builddir: false,
            build_dir: None,
        }
    }
}

impl KitchenConfig {
    /// Configuration with an explicit source cache
    pub fn with_source_cache(source_cache: impl Into<PathBuf>) -> Self {
        Self {
            source_cache: source_cache.into(),
            ..Self::default()
        }
    }

    /// Configuration that never touches system packages
    ///
    /// Used for unattended builds where the host is provisioned separately.
    pub fn offline_host(source_cache: impl Into<PathBuf>) -> Self {
        Self {
            sysreq_mode: SysreqMode::Disabled,
            ..Self::with_source_cache(source_cache)
        }
    }
}

/// Result of cooking a recipe
#[derive(Debug)]
pub struct CookResult {
    /// Directory holding the packaged artifacts
    pub package_dir: PathBuf,
    /// Requirements resolved for the target platform
    pub requirements: Vec<Requirement>,
    /// Complete definitions the build was configured with
    pub definitions: CMakeDefinitions,
    /// Consumer metadata
    pub cpp_info: CppInfo,
    /// System package handling outcome
    pub system_requirements: SystemRequirementsResult,
    /// Build directory, when it was kept
    pub build_dir: Option<PathBuf>,
    /// Build log
    pub log: String,
    /// Warnings generated during the cook
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kitchen_config_default() {
        let config = KitchenConfig::default();
        assert!(config.jobs > 0);
        assert!(!config.keep_builddir);
        assert!(config.build_dir.is_none());
        assert!(config.generator.is_none());
        assert_eq!(config.sysreq_mode, SysreqMode::Enabled);
        assert_eq!(config.cmake_program, PathBuf::from("cmake"));
        assert!(config.source_cache.ends_with("osg-recipe/sources"));
    }

    #[test]
    fn test_kitchen_config_offline_host() {
        let config = KitchenConfig::offline_host("/srv/sources");
        assert_eq!(config.source_cache, PathBuf::from("/srv/sources"));
        assert_eq!(config.sysreq_mode, SysreqMode::Disabled);
        assert!(config.jobs > 0);
    }
}
