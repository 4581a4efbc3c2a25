// src/commands/inspect.rs

//! Read-only commands: info, package-info, completions

use super::load_recipe;
use crate::cli::{Cli, RecipeArgs};
use anyhow::{Context, Result, bail};
use clap::CommandFactory;
use clap_complete::Shell;
use osg_recipe::recipe::{CppInfo, Recipe};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

fn options_map(recipe: &Recipe) -> BTreeMap<&str, bool> {
    recipe.options.iter().collect()
}

/// Show recipe metadata and the evaluated configuration
pub fn cmd_info(args: &RecipeArgs, json: bool) -> Result<()> {
    let recipe = load_recipe(args)?;
    let requirements = recipe
        .requirements()
        .context("Failed to resolve requirements")?;
    let definitions = recipe
        .cmake_definitions()
        .context("Failed to compute CMake definitions")?;

    if json {
        let document = serde_json::json!({
            "name": recipe.name,
            "version": recipe.version,
            "description": recipe.description,
            "homepage": recipe.homepage,
            "url": recipe.url,
            "license": recipe.license,
            "topics": recipe.topics,
            "settings": recipe.settings,
            "options": options_map(&recipe),
            "requires": requirements.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
            "source": recipe.source,
            "cmake_definitions": definitions,
            "system_packages": recipe.system_packages(),
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!("{}", recipe.reference());
    println!("  {}", recipe.description);
    println!("  Homepage: {}", recipe.homepage);
    println!("  Recipe:   {}", recipe.url);
    println!("  License:  {}", recipe.license);
    println!("  Topics:   {}", recipe.topics.join(", "));
    println!();
    println!("Settings: {}", recipe.settings);
    println!("Options:");
    for (name, value) in recipe.options.iter() {
        println!("  {} = {}", name, if value { "True" } else { "False" });
    }
    println!();
    println!("Requires:");
    for requirement in requirements.iter() {
        println!("  {}", requirement);
    }
    println!();
    println!("Source:");
    println!("  URL:    {}", recipe.source.url);
    println!("  SHA256: {}", recipe.source.sha256);
    println!();
    println!("CMake definitions:");
    for (name, value) in definitions.iter() {
        println!("  {}={}", name, value);
    }
    if recipe.settings.is_linux() {
        println!();
        println!("System packages (Linux hosts):");
        for package in recipe.system_packages() {
            println!("  {}", package);
        }
    }

    Ok(())
}

/// Report consumer metadata for a packaged directory
pub fn cmd_package_info(package_dir: &Path, args: &RecipeArgs, json: bool) -> Result<()> {
    if !package_dir.is_dir() {
        bail!("Package directory not found: {}", package_dir.display());
    }

    let info = package_metadata(package_dir, args)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Package: {}", package_dir.display());
    println!("  Libraries:   {}", info.libs.join(" "));
    println!("  System libs: {}", info.system_libs.join(" "));
    println!("  Defines:     {}", info.defines.join(" "));
    println!("  Include dirs: {}", info.include_dirs.join(" "));
    println!("  Lib dirs:    {}", info.lib_dirs.join(" "));
    println!("  Bin dirs:    {}", info.bin_dirs.join(" "));

    Ok(())
}

/// Metadata recorded at cook time, or evaluated from the recipe when the
/// package has none
fn package_metadata(package_dir: &Path, args: &RecipeArgs) -> Result<CppInfo> {
    if let Some(info) = CppInfo::read_cooked(package_dir)
        .with_context(|| format!("Failed to read package {}", package_dir.display()))?
    {
        return Ok(info);
    }

    let recipe = load_recipe(args)?;
    recipe
        .package_info(package_dir)
        .with_context(|| format!("Failed to read package {}", package_dir.display()))
}

/// Print a shell completion script
pub fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "osg-recipe", &mut io::stdout());
    Ok(())
}
