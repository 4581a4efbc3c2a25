// src/recipe/package_info.rs

//! Consumer-facing package metadata

use crate::error::{Error, Result};
use crate::options::OptionSet;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Name of the metadata file written into the package directory
pub const PACKAGE_INFO_FILE: &str = "package_info.json";

/// Preprocessor definition consumers need when linking the static libraries
pub const STATIC_DEFINE: &str = "OSG_LIBRARY_STATIC=1";

/// Extra system library required on Linux
pub const LINUX_SYSTEM_LIB: &str = "rt";

/// File extensions recognized as libraries
const LIB_EXTENSIONS: &[&str] = &["so", "lib", "a", "dylib", "bc"];

/// Link and compile requirements exported to consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CppInfo {
    pub libs: Vec<String>,
    pub system_libs: Vec<String>,
    pub defines: Vec<String>,
    pub include_dirs: Vec<String>,
    pub lib_dirs: Vec<String>,
    pub bin_dirs: Vec<String>,
}

impl Default for CppInfo {
    fn default() -> Self {
        Self {
            libs: Vec::new(),
            system_libs: Vec::new(),
            defines: Vec::new(),
            include_dirs: vec!["include".to_string()],
            lib_dirs: vec!["lib".to_string()],
            bin_dirs: vec!["bin".to_string()],
        }
    }
}

impl CppInfo {
    /// Build the metadata for a package directory
    ///
    /// Libraries are collected from the package's library directories; `rt`
    /// is appended on Linux and the static define when not shared.
    pub fn for_package(package_dir: &Path, settings: &Settings, options: &OptionSet) -> Result<Self> {
        let defaults = Self::default();
        let libs = collect_libs(package_dir, &defaults.lib_dirs)?;
        let mut info = Self { libs, ..defaults };

        if settings.is_linux() {
            info.system_libs.push(LINUX_SYSTEM_LIB.to_string());
        }
        if !options.require("shared")? {
            info.defines.push(STATIC_DEFINE.to_string());
        }

        Ok(info)
    }

    /// Read the metadata recorded when the package was cooked
    ///
    /// Returns `None` when the package has no `package_info.json`.
    pub fn read_cooked(package_dir: &Path) -> Result<Option<Self>> {
        let path = package_dir.join(PACKAGE_INFO_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let document: PackageInfoDocument = serde_json::from_str(&content).map_err(|e| {
            Error::ParseError(format!("Invalid {}: {}", path.display(), e))
        })?;
        debug!("Read cooked package info from {}", path.display());
        Ok(Some(document.cpp_info))
    }
}

/// The part of `package_info.json` consumers read back
#[derive(Deserialize)]
struct PackageInfoDocument {
    cpp_info: CppInfo,
}

/// Collect library names from the package's library directories
///
/// Only the top level of each directory is scanned. `libfoo.a` and
/// `libfoo.so` both yield `foo`; `.lib` names keep any `lib` prefix.
/// Missing directories are skipped. The result is sorted and unique.
pub fn collect_libs(package_dir: &Path, lib_dirs: &[String]) -> Result<Vec<String>> {
    let mut libs = Vec::new();

    for lib_dir in lib_dirs {
        let dir = package_dir.join(lib_dir);
        if !dir.is_dir() {
            debug!("Library directory {} does not exist, skipping", dir.display());
            continue;
        }

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let path = entry.path();
            let (Some(stem), Some(ext)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.extension().and_then(|e| e.to_str()),
            ) else {
                continue;
            };

            if !LIB_EXTENSIONS.contains(&ext) {
                continue;
            }

            let name = match stem.strip_prefix("lib") {
                Some(stripped) if ext != "lib" => stripped,
                _ => stem,
            };

            if !libs.iter().any(|l| l == name) {
                libs.push(name.to_string());
            }
        }
    }

    libs.sort();
    Ok(libs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::OPTION_DEFS;
    use crate::settings::Os;

    fn touch(dir: &Path, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_collect_libs() {
        let pkg = tempfile::tempdir().unwrap();
        let lib = pkg.path().join("lib");
        touch(&lib, "libosg.a");
        touch(&lib, "libOpenThreads.so");
        touch(&lib, "libosg.so");
        touch(&lib, "osgViewer.lib");
        touch(&lib, "libosgDB.lib");
        touch(&lib, "README.txt");
        touch(&lib.join("osgPlugins-3.6.5"), "osgdb_png.so");

        let libs = collect_libs(pkg.path(), &["lib".to_string()]).unwrap();
        assert_eq!(libs, vec!["OpenThreads", "libosgDB", "osg", "osgViewer"]);
    }

    #[test]
    fn test_collect_libs_missing_dir() {
        let pkg = tempfile::tempdir().unwrap();
        let libs = collect_libs(pkg.path(), &["lib".to_string()]).unwrap();
        assert!(libs.is_empty());
    }

    #[test]
    fn test_static_define() {
        let pkg = tempfile::tempdir().unwrap();
        let settings = Settings::for_os(Os::Macos);

        let options = OptionSet::from_defs(OPTION_DEFS);
        let info = CppInfo::for_package(pkg.path(), &settings, &options).unwrap();
        assert_eq!(info.defines, vec![STATIC_DEFINE]);

        let mut shared = OptionSet::from_defs(OPTION_DEFS);
        shared.set("shared", true).unwrap();
        let info = CppInfo::for_package(pkg.path(), &settings, &shared).unwrap();
        assert!(info.defines.is_empty());
    }

    #[test]
    fn test_read_cooked() {
        let pkg = tempfile::tempdir().unwrap();
        assert!(CppInfo::read_cooked(pkg.path()).unwrap().is_none());

        let recorded = CppInfo {
            libs: vec!["osg".to_string()],
            ..CppInfo::default()
        };
        let document = serde_json::json!({
            "name": "openscenegraph",
            "options": { "shared": true },
            "cpp_info": recorded,
        });
        fs::write(pkg.path().join(PACKAGE_INFO_FILE), document.to_string()).unwrap();

        let info = CppInfo::read_cooked(pkg.path()).unwrap().unwrap();
        assert_eq!(info, recorded);
        assert!(info.defines.is_empty());
    }

    #[test]
    fn test_read_cooked_invalid() {
        let pkg = tempfile::tempdir().unwrap();
        fs::write(pkg.path().join(PACKAGE_INFO_FILE), "{ not json").unwrap();
        assert!(matches!(
            CppInfo::read_cooked(pkg.path()),
            Err(Error::ParseError(_))
        ));
    }

    #[test]
    fn test_linux_system_lib() {
        let pkg = tempfile::tempdir().unwrap();
        let options = OptionSet::from_defs(OPTION_DEFS);

        let linux = CppInfo::for_package(pkg.path(), &Settings::for_os(Os::Linux), &options).unwrap();
        assert_eq!(linux.system_libs, vec![LINUX_SYSTEM_LIB]);

        for os in [Os::Windows, Os::Macos, Os::FreeBsd, Os::Android] {
            let info = CppInfo::for_package(pkg.path(), &Settings::for_os(os), &options).unwrap();
            assert!(info.system_libs.is_empty(), "{}", os);
        }
    }
}
