// src/recipe/kitchen/mod.rs

//! Kitchen: the build environment for cooking the recipe
//!
//! The Kitchen owns everything that outlives a single evaluation:
//! - The verified source cache
//! - The fetcher used for downloads
//! - The build tool (CMake) and the system package tool
//!
//! Each call to [`Kitchen::cook`] creates a fresh [`Cook`] that runs the
//! phases in order. External effects sit behind traits so they can be
//! replaced with recording implementations.

mod archive;
mod config;
mod cook;

pub use archive::{HttpFetcher, SourceFetcher, extract_archive, verify_file_checksum};
pub use config::{CookResult, KitchenConfig};
pub use cook::{Cook, CookPhase};

use crate::error::{Error, Result};
use crate::hash::Sha256Digest;
use crate::recipe::Recipe;
use crate::recipe::cmake::{BuildTool, CMake};
use crate::recipe::source::SourceDescriptor;
use crate::recipe::system::SystemPackageTool;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The Kitchen: where the recipe is cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    pub(crate) build_tool: Arc<dyn BuildTool>,
    fetcher: Option<Arc<dyn SourceFetcher>>,
    pub(crate) package_tool: Option<Arc<dyn SystemPackageTool>>,
    pub(crate) detect_package_tool: bool,
    pub(crate) host_is_linux: bool,
}

impl Kitchen {
    /// Create a new Kitchen with the given configuration
    ///
    /// Uses `cmake` from the configuration, HTTP downloads, and apt when it
    /// is found on a Linux host.
    pub fn new(config: KitchenConfig) -> Self {
        let mut cmake = CMake::new(&config.cmake_program);
        if let Some(generator) = &config.generator {
            cmake = cmake.with_generator(generator.clone());
        }

        Self {
            config,
            build_tool: Arc::new(cmake),
            fetcher: None,
            package_tool: None,
            detect_package_tool: true,
            host_is_linux: cfg!(target_os = "linux"),
        }
    }

    /// Replace the build tool
    pub fn with_build_tool(mut self, build_tool: Arc<dyn BuildTool>) -> Self {
        self.build_tool = build_tool;
        self
    }

    /// Replace the source fetcher
    pub fn with_fetcher(mut self, fetcher: Arc<dyn SourceFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use a specific system package tool instead of detecting one
    pub fn with_package_tool(mut self, tool: Arc<dyn SystemPackageTool>) -> Self {
        self.package_tool = Some(tool);
        self
    }

    /// Never use a system package tool, not even a detected one
    pub fn without_package_tool(mut self) -> Self {
        self.package_tool = None;
        self.detect_package_tool = false;
        self
    }

    /// Override host detection for system requirements
    pub fn with_host_linux(mut self, host_is_linux: bool) -> Self {
        self.host_is_linux = host_is_linux;
        self
    }

    /// Start a cook without running any phase
    ///
    /// Callers drive the phases themselves; [`Kitchen::cook`] runs them all.
    pub fn start_cook<'a>(&'a self, recipe: &'a Recipe, package_dir: &Path) -> Result<Cook<'a>> {
        Cook::new(self, recipe, package_dir)
    }

    /// Cook the recipe into `package_dir`
    ///
    /// ## Cooking Process
    /// 1. **Resolve**: requirements and system packages
    /// 2. **Fetch**: download (or reuse), verify and unpack the sources
    /// 3. **Configure**: generate the build tree once
    /// 4. **Build**: compile
    /// 5. **Package**: license, install, consumer metadata
    pub fn cook(&self, recipe: &Recipe, package_dir: &Path) -> Result<CookResult> {
        info!(
            "Cooking {} for {}",
            recipe.reference(),
            recipe.settings
        );
        debug!("Options: {}", recipe.options);

        let mut cook = self.start_cook(recipe, package_dir)?;

        cook.resolve()?;
        cook.fetch()?;
        cook.configure()?;
        cook.build()?;
        cook.package()?;

        let result = cook.finish()?;
        for warning in &result.warnings {
            warn!("{}", warning);
        }
        info!("Packaged {} into {}", recipe.reference(), result.package_dir.display());
        Ok(result)
    }

    /// Fetch the recipe's source into the cache without building
    ///
    /// Returns the path of the verified, cached archive.
    pub fn fetch(&self, recipe: &Recipe) -> Result<PathBuf> {
        info!("Fetching sources for {}", recipe.reference());
        self.fetch_source(&recipe.source)
    }

    /// Check whether the recipe's source is already cached
    ///
    /// Only checks presence; the archive is re-verified when used.
    pub fn source_cached(&self, recipe: &Recipe) -> bool {
        Sha256Digest::new(recipe.source.sha256.as_str())
            .map(|digest| self.config.source_cache.join(digest.cache_key()).is_file())
            .unwrap_or(false)
    }

    /// Fetch a source archive (with caching)
    pub(crate) fn fetch_source(&self, source: &SourceDescriptor) -> Result<PathBuf> {
        let digest: Sha256Digest = source
            .sha256
            .parse()
            .map_err(|e| Error::ParseError(format!("Invalid source checksum: {}", e)))?;

        fs::create_dir_all(&self.config.source_cache)?;

        let cache_key = digest.cache_key();
        let cached_path = self.config.source_cache.join(&cache_key);

        if cached_path.exists() {
            debug!("Using cached source: {}", cached_path.display());
            match verify_file_checksum(&cached_path, digest.as_str()) {
                Ok(()) => return Ok(cached_path),
                Err(e @ Error::ChecksumMismatch { .. }) => {
                    warn!("Cached source is corrupt ({}), re-downloading", e);
                    fs::remove_file(&cached_path)?;
                }
                Err(e) => return Err(e),
            }
        }

        let temp_path = self.config.source_cache.join(format!("{}.tmp", cache_key));

        let fetched = match &self.fetcher {
            Some(fetcher) => fetcher.fetch(&source.url, &temp_path),
            None => HttpFetcher::new(self.config.download_timeout)
                .and_then(|fetcher| fetcher.fetch(&source.url, &temp_path)),
        };
        if let Err(e) = fetched {
            if temp_path.exists() {
                fs::remove_file(&temp_path)?;
            }
            return Err(e);
        }

        if let Err(e) = verify_file_checksum(&temp_path, digest.as_str()) {
            fs::remove_file(&temp_path)?;
            return Err(e);
        }

        fs::rename(&temp_path, &cached_path)?;
        info!("Cached source {}", cached_path.display());
        Ok(cached_path)
    }
}
