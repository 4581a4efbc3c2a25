// src/recipe/profile.rs

//! TOML profiles: settings and option values kept in a file
//!
//! Every field is optional; a profile is layered on top of the detected
//! host settings and the recipe's option defaults.
//!
//! ```toml
//! [settings]
//! os = "Windows"
//! arch = "x86_64"
//! build_type = "Release"
//!
//! [settings.compiler]
//! name = "Visual Studio"
//! version = "16"
//! runtime = "MT"
//!
//! [options]
//! shared = true
//! ```

use crate::error::{Error, Result};
use crate::options::OptionSet;
use crate::settings::{Arch, BuildType, Compiler, CompilerKind, Os, Runtime, Settings};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Partial settings from a profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSettings {
    #[serde(default)]
    pub os: Option<Os>,
    #[serde(default)]
    pub arch: Option<Arch>,
    #[serde(default)]
    pub build_type: Option<BuildType>,
    #[serde(default)]
    pub compiler: Option<ProfileCompiler>,
}

/// Partial compiler settings from a profile
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileCompiler {
    pub name: CompilerKind,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub runtime: Option<Runtime>,
}

/// A parsed profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub settings: ProfileSettings,
    #[serde(default)]
    pub options: BTreeMap<String, bool>,
}

impl Profile {
    /// Parse a profile from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid profile: {}", e)))
    }

    /// Parse a profile from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::IoError(format!("Failed to read profile {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Layer the profile's settings over `base`
    ///
    /// Changing the OS without naming a compiler switches to that OS's
    /// default compiler.
    pub fn apply_settings(&self, base: &mut Settings) -> Result<()> {
        let s = &self.settings;

        if let Some(os) = s.os {
            if os != base.os && s.compiler.is_none() {
                base.compiler = Compiler::default_for(os);
            }
            base.os = os;
        }
        if let Some(arch) = s.arch {
            base.arch = arch;
        }
        if let Some(build_type) = s.build_type {
            base.build_type = Some(build_type);
        }
        if let Some(compiler) = &s.compiler {
            if compiler.runtime.is_some() && compiler.name != CompilerKind::VisualStudio {
                return Err(Error::InvalidSetting(format!(
                    "compiler.runtime is only defined for Visual Studio (compiler is {})",
                    compiler.name
                )));
            }
            base.compiler = Compiler {
                kind: compiler.name,
                version: compiler.version.clone(),
                runtime: compiler.runtime,
            };
        }

        Ok(())
    }

    /// Apply the profile's option values
    pub fn apply_options(&self, options: &mut OptionSet) -> Result<()> {
        for (name, value) in &self.options {
            options.set(name, *value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::OPTION_DEFS;

    const WINDOWS_PROFILE: &str = r#"
[settings]
os = "Windows"
build_type = "Debug"

[settings.compiler]
name = "Visual Studio"
version = "16"
runtime = "MTd"

[options]
shared = true
"#;

    #[test]
    fn test_parse_profile() {
        let profile = Profile::parse(WINDOWS_PROFILE).unwrap();
        assert_eq!(profile.settings.os, Some(Os::Windows));
        assert_eq!(profile.settings.build_type, Some(BuildType::Debug));
        let compiler = profile.settings.compiler.as_ref().unwrap();
        assert_eq!(compiler.name, CompilerKind::VisualStudio);
        assert_eq!(compiler.runtime, Some(Runtime::MtDebug));
        assert_eq!(profile.options.get("shared"), Some(&true));
    }

    #[test]
    fn test_apply_settings() {
        let profile = Profile::parse(WINDOWS_PROFILE).unwrap();
        let mut settings = Settings::for_os(Os::Linux);
        profile.apply_settings(&mut settings).unwrap();

        assert!(settings.is_windows());
        assert_eq!(settings.compiler.runtime, Some(Runtime::MtDebug));
        assert_eq!(settings.compiler.version.as_deref(), Some("16"));
        assert_eq!(settings.build_type, Some(BuildType::Debug));
    }

    #[test]
    fn test_os_switch_uses_default_compiler() {
        let profile = Profile::parse("[settings]\nos = \"Macos\"\n").unwrap();
        let mut settings = Settings::for_os(Os::Linux);
        profile.apply_settings(&mut settings).unwrap();
        assert_eq!(settings.compiler.kind, CompilerKind::AppleClang);
    }

    #[test]
    fn test_runtime_without_visual_studio() {
        let profile = Profile::parse(
            "[settings.compiler]\nname = \"gcc\"\nruntime = \"MT\"\n",
        )
        .unwrap();
        let mut settings = Settings::for_os(Os::Linux);
        assert!(profile.apply_settings(&mut settings).is_err());
    }

    #[test]
    fn test_apply_options() {
        let profile = Profile::parse(WINDOWS_PROFILE).unwrap();
        let mut options = OptionSet::from_defs(OPTION_DEFS);
        profile.apply_options(&mut options).unwrap();
        assert_eq!(options.get("shared"), Some(true));

        let bad = Profile::parse("[options]\nstatic = true\n").unwrap();
        assert!(bad.apply_options(&mut options).is_err());
    }

    #[test]
    fn test_invalid_profile() {
        assert!(Profile::parse("[settings]\nos = \"Plan9\"\n").is_err());
        assert!(Profile::parse("[settings]\ndistro = \"x\"\n").is_err());
        assert!(Profile::parse("not toml {").is_err());
    }

    #[test]
    fn test_empty_profile() {
        let profile = Profile::parse("").unwrap();
        let mut settings = Settings::for_os(Os::Linux);
        profile.apply_settings(&mut settings).unwrap();
        assert_eq!(settings, Settings::for_os(Os::Linux));
    }
}
