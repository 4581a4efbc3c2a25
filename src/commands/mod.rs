// src/commands/mod.rs
//! Command handlers for the osg-recipe CLI

mod cook;
mod inspect;

pub use cook::{CookArgs, cmd_cook, cmd_fetch};
pub use inspect::{cmd_completions, cmd_info, cmd_package_info};

use crate::cli::RecipeArgs;
use anyhow::{Context, Result};
use osg_recipe::recipe::{Profile, Recipe};
use osg_recipe::settings::Settings;
use tracing::debug;

/// Evaluate the recipe for the host, a profile and command-line overrides
///
/// Precedence, lowest first: detected host, profile, `-s`/`-o` flags.
pub fn load_recipe(args: &RecipeArgs) -> Result<Recipe> {
    let mut settings = Settings::detect();

    let profile = match &args.profile {
        Some(path) => Some(
            Profile::from_file(path)
                .with_context(|| format!("Failed to load profile {}", path.display()))?,
        ),
        None => None,
    };

    if let Some(profile) = &profile {
        profile
            .apply_settings(&mut settings)
            .context("Invalid settings in profile")?;
    }
    settings
        .apply_all(&args.settings)
        .context("Invalid setting override")?;
    debug!("Settings: {}", settings);

    let mut recipe = Recipe::new(settings);

    if let Some(profile) = &profile {
        profile
            .apply_options(&mut recipe.options)
            .context("Invalid options in profile")?;
    }
    recipe
        .options
        .apply_all(&args.options)
        .context("Invalid option override")?;
    debug!("Options: {}", recipe.options);

    Ok(recipe)
}
