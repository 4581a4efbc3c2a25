// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use commands::CookArgs;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { recipe, json } => commands::cmd_info(&recipe, json),
        Commands::Fetch {
            recipe,
            source_cache,
        } => commands::cmd_fetch(&recipe, source_cache),
        Commands::Cook {
            recipe,
            package_dir,
            source_cache,
            build_dir,
            jobs,
            keep_builddir,
            cmake,
            generator,
            sysreq,
        } => commands::cmd_cook(
            &recipe,
            &CookArgs {
                package_dir,
                source_cache,
                build_dir,
                jobs,
                keep_builddir,
                cmake,
                generator,
                sysreq,
            },
        ),
        Commands::PackageInfo {
            package_dir,
            recipe,
            json,
        } => commands::cmd_package_info(&package_dir, &recipe, json),
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
