// src/recipe/system.rs

//! System package requirements
//!
//! On Linux hosts the toolkit needs a few distribution development packages
//! that are not provided as recipe requirements. Installing them is best
//! effort: a missing package manager or a failed install is logged and the
//! cook carries on.

use crate::error::{Error, Result};
use serde::Serialize;
use std::process::Command;
use strum_macros::{Display, EnumString};
use tracing::{debug, info, warn};

/// Development packages installed through the system package manager
pub const SYSTEM_PACKAGES: &[&str] = &[
    "libegl1-mesa-dev",
    "libgtk2.0-dev",
    "libpoppler-glib-dev",
];

/// How system requirements are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SysreqMode {
    /// Install missing packages
    #[default]
    Enabled,
    /// Only report missing packages
    Verify,
    /// Skip system requirements entirely
    Disabled,
}

/// A platform package manager
///
/// This keeps the cook decoupled from the host's package tooling and lets
/// tests substitute a recording implementation.
pub trait SystemPackageTool: Send + Sync {
    /// Short name for logging (e.g. "apt")
    fn name(&self) -> &str;

    /// Check whether a package is installed
    fn is_installed(&self, package: &str) -> Result<bool>;

    /// Install a package
    fn install(&self, package: &str) -> Result<()>;
}

/// apt/dpkg based package tool
#[derive(Debug, Clone)]
pub struct Apt {
    sudo: bool,
}

impl Apt {
    /// Detect apt on the host
    ///
    /// Returns `None` when `apt-get` is not on `PATH`.
    pub fn detect() -> Option<Self> {
        let apt = which::which("apt-get").ok()?;
        debug!("Found apt-get at {}", apt.display());
        Some(Self {
            sudo: !running_as_root() && which::which("sudo").is_ok(),
        })
    }

    fn command(&self, program: &str) -> Command {
        if self.sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(program);
            cmd
        } else {
            Command::new(program)
        }
    }
}

impl SystemPackageTool for Apt {
    fn name(&self) -> &str {
        "apt"
    }

    fn is_installed(&self, package: &str) -> Result<bool> {
        let output = Command::new("dpkg-query")
            .args(["-W", "-f", "${Status}", package])
            .output()
            .map_err(|e| Error::InitError(format!("Failed to run dpkg-query: {}", e)))?;

        // dpkg-query exits non-zero for packages it has never seen
        if !output.status.success() {
            return Ok(false);
        }

        Ok(String::from_utf8_lossy(&output.stdout).contains("install ok installed"))
    }

    fn install(&self, package: &str) -> Result<()> {
        let output = self
            .command("apt-get")
            .args(["install", "-y", "--no-install-recommends", package])
            .env("DEBIAN_FRONTEND", "noninteractive")
            .output()
            .map_err(|e| Error::InitError(format!("Failed to run apt-get: {}", e)))?;

        if !output.status.success() {
            return Err(Error::BuildFailed {
                step: format!("apt-get install {}", package),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(())
    }
}

fn running_as_root() -> bool {
    Command::new("id")
        .arg("-u")
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).trim() == "0")
        .unwrap_or(false)
}

/// Outcome of system requirement handling
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SystemRequirementsResult {
    /// Packages that were already installed
    pub already_installed: Vec<String>,
    /// Packages installed for this cook
    pub newly_installed: Vec<String>,
    /// Packages found missing in verify mode
    pub missing: Vec<String>,
    /// Packages whose check or installation failed
    pub failed: Vec<String>,
    /// Why the step was skipped, if it was
    pub skipped: Option<String>,
}

/// Handle the system requirements for one cook
///
/// Never fails: every problem is logged and recorded in the result.
pub fn install_system_requirements(
    packages: &[&str],
    mode: SysreqMode,
    host_is_linux: bool,
    tool: Option<&dyn SystemPackageTool>,
) -> SystemRequirementsResult {
    let mut result = SystemRequirementsResult::default();

    if mode == SysreqMode::Disabled {
        debug!("System requirements disabled");
        result.skipped = Some("disabled".to_string());
        return result;
    }

    if !host_is_linux {
        debug!("Host is not Linux, no system requirements");
        result.skipped = Some("not a Linux host".to_string());
        return result;
    }

    let Some(tool) = tool else {
        warn!("Could not determine Linux package manager, skipping system requirements installation.");
        result.skipped = Some("no supported package manager".to_string());
        return result;
    };

    info!(
        "Checking system requirements with {}: {}",
        tool.name(),
        packages.join(", ")
    );

    for package in packages {
        match tool.is_installed(package) {
            Ok(true) => {
                debug!("{} is already installed", package);
                result.already_installed.push(package.to_string());
            }
            Ok(false) if mode == SysreqMode::Verify => {
                warn!("System package {} is not installed", package);
                result.missing.push(package.to_string());
            }
            Ok(false) => match tool.install(package) {
                Ok(()) => {
                    info!("Installed system package {}", package);
                    result.newly_installed.push(package.to_string());
                }
                Err(e) => {
                    warn!("Failed to install system package {}: {}", package, e);
                    result.failed.push(package.to_string());
                }
            },
            Err(e) => {
                warn!("Could not query system package {}: {}", package, e);
                result.failed.push(package.to_string());
            }
        }
    }

    result
}
