// src/commands/cook.rs

//! Cook and fetch commands

use super::load_recipe;
use crate::cli::RecipeArgs;
use anyhow::{Context, Result};
use osg_recipe::recipe::{Kitchen, KitchenConfig, SysreqMode};
use std::path::PathBuf;
use tracing::info;

/// Kitchen-related flags of the cook command
#[derive(Debug, Clone, Default)]
pub struct CookArgs {
    pub package_dir: PathBuf,
    pub source_cache: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,
    pub jobs: Option<u32>,
    pub keep_builddir: bool,
    pub cmake: Option<PathBuf>,
    pub generator: Option<String>,
    pub sysreq: SysreqMode,
}

impl CookArgs {
    fn kitchen_config(&self) -> KitchenConfig {
        let mut config = KitchenConfig {
            build_dir: self.build_dir.clone(),
            keep_builddir: self.keep_builddir,
            generator: self.generator.clone(),
            sysreq_mode: self.sysreq,
            ..Default::default()
        };

        if let Some(cache) = &self.source_cache {
            config.source_cache = cache.clone();
        }
        if let Some(j) = self.jobs {
            config.jobs = j;
        }
        if let Some(cmake) = &self.cmake {
            config.cmake_program = cmake.clone();
        }

        config
    }
}

/// Build and package the recipe
pub fn cmd_cook(recipe_args: &RecipeArgs, args: &CookArgs) -> Result<()> {
    let recipe = load_recipe(recipe_args)?;
    let config = args.kitchen_config();

    println!("Recipe: {}", recipe.reference());
    println!("Settings: {}", recipe.settings);
    println!("Options: {}", recipe.options);

    std::fs::create_dir_all(&args.package_dir).with_context(|| {
        format!(
            "Failed to create package directory: {}",
            args.package_dir.display()
        )
    })?;

    let kitchen = Kitchen::new(config.clone());

    if kitchen.source_cached(&recipe) {
        println!("  - Source already cached in {}", config.source_cache.display());
    }
    println!("Cooking with {} parallel jobs...", config.jobs);

    let result = kitchen
        .cook(&recipe, &args.package_dir)
        .with_context(|| format!("Failed to cook {}", recipe.reference()))?;

    println!("\n[COMPLETE] Cooked: {}", result.package_dir.display());
    println!("  Libraries: {}", result.cpp_info.libs.join(", "));
    if !result.cpp_info.system_libs.is_empty() {
        println!("  System libs: {}", result.cpp_info.system_libs.join(", "));
    }
    if !result.cpp_info.defines.is_empty() {
        println!("  Defines: {}", result.cpp_info.defines.join(", "));
    }
    if let Some(dir) = &result.build_dir {
        println!("  Build directory kept at {}", dir.display());
    }

    if !result.warnings.is_empty() {
        println!("\nBuild warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    info!(
        "Successfully cooked {} to {}",
        recipe.reference(),
        result.package_dir.display()
    );

    Ok(())
}

/// Fetch and verify the source archive without building
pub fn cmd_fetch(recipe_args: &RecipeArgs, source_cache: Option<PathBuf>) -> Result<()> {
    let recipe = load_recipe(recipe_args)?;
    let config = match source_cache {
        Some(cache) => KitchenConfig::with_source_cache(cache),
        None => KitchenConfig::default(),
    };
    let kitchen = Kitchen::new(config);

    println!("Fetching sources for {}...", recipe.reference());
    let path = kitchen
        .fetch(&recipe)
        .with_context(|| format!("Failed to fetch sources for {}", recipe.reference()))?;

    println!("\n[COMPLETE] Fetched {}", recipe.source.url);
    println!("  - {}", path.display());
    println!("\n[OK] Source is cached. Ready for offline build.");

    Ok(())
}
