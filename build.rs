// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common arguments: profile and overrides
fn recipe_args() -> [Arg; 3] {
    [
        Arg::new("profile")
            .long("profile")
            .value_name("FILE")
            .help("TOML profile with settings and options"),
        Arg::new("setting")
            .short('s')
            .long("setting")
            .value_name("KEY=VALUE")
            .action(ArgAction::Append)
            .help("Setting override (e.g. os=Windows, compiler.runtime=MT)"),
        Arg::new("option")
            .short('o')
            .long("option")
            .value_name("NAME=VALUE")
            .action(ArgAction::Append)
            .help("Option override (e.g. shared=True)"),
    ]
}

fn source_cache_arg() -> Arg {
    Arg::new("source_cache")
        .long("source-cache")
        .value_name("DIR")
        .help("Source cache directory")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print as JSON")
}

fn build_cli() -> Command {
    Command::new("osg-recipe")
        .version(env!("CARGO_PKG_VERSION"))
        .author("osg-recipe Contributors")
        .about("Build and package OpenSceneGraph from source")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("info")
                .about("Show recipe metadata, requirements and build configuration")
                .args(recipe_args())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("fetch")
                .about("Download and verify the source archive into the cache")
                .args(recipe_args())
                .arg(source_cache_arg()),
        )
        .subcommand(
            Command::new("cook")
                .about("Build and package the recipe")
                .args(recipe_args())
                .arg(
                    Arg::new("package_dir")
                        .long("package-dir")
                        .required(true)
                        .help("Directory the package is installed into"),
                )
                .arg(source_cache_arg())
                .arg(
                    Arg::new("build_dir")
                        .long("build-dir")
                        .help("Build in this directory instead of a temporary one"),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help("Number of parallel build jobs (default: available CPUs)"),
                )
                .arg(
                    Arg::new("keep_builddir")
                        .long("keep-builddir")
                        .action(ArgAction::SetTrue)
                        .help("Keep the build directory after completion"),
                )
                .arg(Arg::new("cmake").long("cmake").value_name("PATH").help("Path to the cmake executable"))
                .arg(Arg::new("generator").long("generator").value_name("NAME").help("CMake generator (e.g. Ninja)"))
                .arg(
                    Arg::new("sysreq")
                        .long("sysreq")
                        .default_value("enabled")
                        .value_parser(["enabled", "verify", "disabled"])
                        .help("System package handling"),
                ),
        )
        .subcommand(
            Command::new("package-info")
                .about("Report consumer metadata for a packaged directory")
                .arg(Arg::new("package_dir").required(true).help("Package directory produced by cook"))
                .args(recipe_args())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(Arg::new("shell").required(true).help("Shell to generate completions for")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("osg-recipe.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
