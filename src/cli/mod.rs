// src/cli/mod.rs
//! CLI definitions for osg-recipe
//!
//! Command implementations live in the `commands` module.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use osg_recipe::recipe::SysreqMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "osg-recipe")]
#[command(version)]
#[command(about = "Build and package OpenSceneGraph from source", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings and option overrides shared by all recipe commands
#[derive(Args, Clone, Debug, Default)]
pub struct RecipeArgs {
    /// TOML profile with settings and options
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Setting override (e.g. os=Windows, compiler.runtime=MT)
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Option override (e.g. shared=True)
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show recipe metadata, requirements and build configuration
    Info {
        #[command(flatten)]
        recipe: RecipeArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download and verify the source archive into the cache
    Fetch {
        #[command(flatten)]
        recipe: RecipeArgs,

        /// Source cache directory
        #[arg(long)]
        source_cache: Option<PathBuf>,
    },

    /// Build and package the recipe
    Cook {
        #[command(flatten)]
        recipe: RecipeArgs,

        /// Directory the package is installed into
        #[arg(long)]
        package_dir: PathBuf,

        /// Source cache directory
        #[arg(long)]
        source_cache: Option<PathBuf>,

        /// Build in this directory instead of a temporary one
        #[arg(long)]
        build_dir: Option<PathBuf>,

        /// Number of parallel build jobs (default: available CPUs)
        #[arg(short, long)]
        jobs: Option<u32>,

        /// Keep the build directory after completion
        #[arg(long)]
        keep_builddir: bool,

        /// Path to the cmake executable
        #[arg(long, value_name = "PATH")]
        cmake: Option<PathBuf>,

        /// CMake generator (e.g. Ninja)
        #[arg(long, value_name = "NAME")]
        generator: Option<String>,

        /// System package handling: enabled, verify, disabled
        #[arg(long, default_value = "enabled")]
        sysreq: SysreqMode,
    },

    /// Report consumer metadata for a packaged directory
    PackageInfo {
        /// Package directory produced by `cook`
        package_dir: PathBuf,

        #[command(flatten)]
        recipe: RecipeArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cook() {
        let cli = Cli::try_parse_from([
            "osg-recipe",
            "cook",
            "--package-dir",
            "/tmp/pkg",
            "-s",
            "os=Windows",
            "-o",
            "shared=True",
            "--sysreq",
            "verify",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Cook {
                recipe,
                package_dir,
                sysreq,
                jobs,
                ..
            } => {
                assert_eq!(package_dir, PathBuf::from("/tmp/pkg"));
                assert_eq!(recipe.settings, vec!["os=Windows"]);
                assert_eq!(recipe.options, vec!["shared=True"]);
                assert_eq!(sysreq, SysreqMode::Verify);
                assert!(jobs.is_none());
            }
            _ => panic!("expected cook"),
        }
    }

    #[test]
    fn test_cook_requires_package_dir() {
        assert!(Cli::try_parse_from(["osg-recipe", "cook"]).is_err());
    }
}
