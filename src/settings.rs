// src/settings.rs

//! Build settings: target OS, architecture, compiler and build type
//!
//! Settings describe *where* and *how* the recipe is built. They are fixed
//! for one recipe evaluation and drive every platform branch the recipe
//! takes (requirements, option domain, CMake flags, link metadata).
//!
//! Textual forms follow the package-manager vocabulary, so profiles and
//! `-s key=value` overrides read `os=Linux`, `compiler=Visual Studio`,
//! `compiler.runtime=MTd`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};
use tracing::debug;

/// Target operating system
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Os {
    Windows,
    Linux,
    Macos,
    #[serde(rename = "FreeBSD")]
    #[strum(serialize = "FreeBSD")]
    FreeBsd,
    Android,
    #[serde(rename = "iOS")]
    #[strum(serialize = "iOS")]
    Ios,
}

/// Target architecture
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Arch {
    X86,
    X86_64,
    Armv7,
    Armv8,
}

/// Compiler family
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum CompilerKind {
    #[serde(rename = "gcc")]
    #[strum(serialize = "gcc")]
    Gcc,
    #[serde(rename = "clang")]
    #[strum(serialize = "clang")]
    Clang,
    #[serde(rename = "apple-clang")]
    #[strum(serialize = "apple-clang")]
    AppleClang,
    #[serde(rename = "Visual Studio")]
    #[strum(serialize = "Visual Studio")]
    VisualStudio,
}

/// Visual Studio C runtime selection
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum Runtime {
    #[serde(rename = "MT")]
    #[strum(serialize = "MT")]
    Mt,
    #[serde(rename = "MTd")]
    #[strum(serialize = "MTd")]
    MtDebug,
    #[serde(rename = "MD")]
    #[strum(serialize = "MD")]
    Md,
    #[serde(rename = "MDd")]
    #[strum(serialize = "MDd")]
    MdDebug,
}

impl Runtime {
    /// Whether the runtime links the CRT statically (`MT`, `MTd`)
    pub fn is_static(&self) -> bool {
        self.to_string().contains("MT")
    }
}

/// CMake build type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

/// Compiler descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compiler {
    /// Compiler family
    #[serde(rename = "name")]
    pub kind: CompilerKind,

    /// Compiler version (informational)
    #[serde(default)]
    pub version: Option<String>,

    /// C runtime (Visual Studio only)
    #[serde(default)]
    pub runtime: Option<Runtime>,
}

impl Compiler {
    /// Create a compiler descriptor without version or runtime
    pub fn new(kind: CompilerKind) -> Self {
        Self {
            kind,
            version: None,
            runtime: None,
        }
    }

    /// Default compiler for a target OS
    pub fn default_for(os: Os) -> Self {
        match os {
            Os::Windows => Self {
                kind: CompilerKind::VisualStudio,
                version: None,
                runtime: Some(Runtime::Md),
            },
            Os::Macos | Os::Ios => Self::new(CompilerKind::AppleClang),
            Os::Android => Self::new(CompilerKind::Clang),
            Os::Linux | Os::FreeBsd => Self::new(CompilerKind::Gcc),
        }
    }

    /// Check if this is the Visual Studio compiler
    pub fn is_visual_studio(&self) -> bool {
        self.kind == CompilerKind::VisualStudio
    }
}

/// Complete settings for one recipe evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub os: Os,
    pub arch: Arch,
    pub compiler: Compiler,
    #[serde(default)]
    pub build_type: Option<BuildType>,
}

impl Settings {
    /// Settings for a target OS with its default compiler, x86_64, Release
    pub fn for_os(os: Os) -> Self {
        Self {
            os,
            arch: Arch::X86_64,
            compiler: Compiler::default_for(os),
            build_type: Some(BuildType::Release),
        }
    }

    /// Detect settings describing the host
    pub fn detect() -> Self {
        let os = match std::env::consts::OS {
            "windows" => Os::Windows,
            "macos" => Os::Macos,
            "freebsd" => Os::FreeBsd,
            "android" => Os::Android,
            "ios" => Os::Ios,
            "linux" => Os::Linux,
            other => {
                debug!("Unrecognized host OS '{}', assuming Linux", other);
                Os::Linux
            }
        };

        let arch = match std::env::consts::ARCH {
            "x86" => Arch::X86,
            "arm" => Arch::Armv7,
            "aarch64" => Arch::Armv8,
            _ => Arch::X86_64,
        };

        Self {
            arch,
            ..Self::for_os(os)
        }
    }

    /// Check if the target OS is Linux
    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }

    /// Check if the target OS is Windows
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Apply a single `key=value` override
    ///
    /// Recognized keys: `os`, `arch`, `build_type`, `compiler`,
    /// `compiler.version`, `compiler.runtime`. Changing the OS switches to
    /// that OS's default compiler.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply_one(key, value, true)
    }

    fn apply_one(&mut self, key: &str, value: &str, reset_compiler: bool) -> Result<()> {
        let invalid = || Error::InvalidSetting(format!("{}={}", key, value));

        match key {
            "os" => {
                let os: Os = value.parse().map_err(|_| invalid())?;
                if os != self.os && reset_compiler {
                    self.compiler = Compiler::default_for(os);
                }
                self.os = os;
            }
            "arch" => self.arch = value.parse().map_err(|_| invalid())?,
            "build_type" => self.build_type = Some(value.parse().map_err(|_| invalid())?),
            "compiler" => {
                let kind: CompilerKind = value.parse().map_err(|_| invalid())?;
                if kind != self.compiler.kind {
                    self.compiler = Compiler::new(kind);
                }
            }
            "compiler.version" => self.compiler.version = Some(value.to_string()),
            "compiler.runtime" => {
                if !self.compiler.is_visual_studio() {
                    return Err(Error::InvalidSetting(format!(
                        "compiler.runtime is only defined for Visual Studio (compiler is {})",
                        self.compiler.kind
                    )));
                }
                self.compiler.runtime = Some(value.parse().map_err(|_| invalid())?);
            }
            _ => {
                return Err(Error::InvalidSetting(format!("unknown setting '{}'", key)));
            }
        }

        Ok(())
    }

    /// Apply a list of `key=value` assignments in order
    ///
    /// An `os` change keeps the current compiler when the list also names
    /// one, as a profile does.
    pub fn apply_all<S: AsRef<str>>(&mut self, assignments: &[S]) -> Result<()> {
        let parsed = assignments
            .iter()
            .map(|assignment| {
                split_assignment(assignment.as_ref())
                    .ok_or_else(|| Error::InvalidSetting(assignment.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let names_compiler = parsed
            .iter()
            .any(|(key, _)| *key == "compiler" || key.starts_with("compiler."));

        for (key, value) in parsed {
            self.apply_one(key, value, !names_compiler)?;
        }
        Ok(())
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.os, self.arch, self.compiler.kind)?;
        if let Some(version) = &self.compiler.version {
            write!(f, " {}", version)?;
        }
        if let Some(runtime) = &self.compiler.runtime {
            write!(f, " ({})", runtime)?;
        }
        if let Some(build_type) = &self.build_type {
            write!(f, " {}", build_type)?;
        }
        Ok(())
    }
}

/// Split `key=value`, trimming both sides
///
/// Returns `None` when there is no `=` or the key is empty.
pub(crate) fn split_assignment(s: &str) -> Option<(&str, &str)> {
    let (key, value) = s.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim().trim_matches('"')))
}
