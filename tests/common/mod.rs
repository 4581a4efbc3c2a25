// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use osg_recipe::hash::sha256;
use osg_recipe::recipe::{
    BuildTool, ConfiguredBuild, Kitchen, KitchenConfig, Recipe, SourceFetcher, StepOutput,
    SysreqMode, SystemPackageTool,
};
use osg_recipe::{Error, Result};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Top-level directory of the upstream release tarball
pub const EXTRACTED_DIR: &str = "OpenSceneGraph-OpenSceneGraph-3.6.5";

/// Build a gzip tarball in memory from (path, contents) pairs
pub fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, data.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// A tarball laid out like the upstream release
pub fn release_tarball() -> Vec<u8> {
    tarball(&[
        (
            &format!("{}/CMakeLists.txt", EXTRACTED_DIR),
            "project(OpenSceneGraph)\n",
        ),
        (&format!("{}/LICENSE.txt", EXTRACTED_DIR), "OpenSceneGraph Public License\n"),
        (&format!("{}/include/osg/Version", EXTRACTED_DIR), "#define OSG_VERSION\n"),
    ])
}

/// Point the recipe's source at in-memory archive bytes
pub fn pin_source(recipe: &mut Recipe, archive: &[u8]) {
    recipe.source.sha256 = sha256(archive);
}

/// Serves fixed bytes for every URL and records requests
pub struct MockFetcher {
    body: Vec<u8>,
    pub requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl SourceFetcher for MockFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.requests.lock().unwrap().push(url.to_string());
        fs::write(dest, &self.body)?;
        Ok(())
    }
}

/// Build tool that records calls and installs a fake package
#[derive(Default)]
pub struct MockBuildTool {
    pub configure_calls: Mutex<Vec<ConfiguredBuild>>,
    pub build_calls: Mutex<Vec<u32>>,
    pub install_calls: Mutex<usize>,
    /// Make the build step fail with this exit code
    pub fail_build: Option<i32>,
}

impl MockBuildTool {
    pub fn failing_build(code: i32) -> Self {
        Self {
            fail_build: Some(code),
            ..Self::default()
        }
    }

    pub fn configure_count(&self) -> usize {
        self.configure_calls.lock().unwrap().len()
    }

    pub fn build_count(&self) -> usize {
        self.build_calls.lock().unwrap().len()
    }

    pub fn install_count(&self) -> usize {
        *self.install_calls.lock().unwrap()
    }

    pub fn total_calls(&self) -> usize {
        self.configure_count() + self.build_count() + self.install_count()
    }
}

impl BuildTool for MockBuildTool {
    fn configure(&self, build: &ConfiguredBuild) -> Result<StepOutput> {
        assert!(build.source_dir.join("CMakeLists.txt").is_file());
        self.configure_calls.lock().unwrap().push(build.clone());
        Ok(StepOutput {
            stdout: "-- Configuring done\n".to_string(),
            stderr: String::new(),
        })
    }

    fn build(&self, _build: &ConfiguredBuild, jobs: u32) -> Result<StepOutput> {
        self.build_calls.lock().unwrap().push(jobs);
        if let Some(code) = self.fail_build {
            return Err(Error::BuildFailed {
                step: "build".to_string(),
                code: Some(code),
                stderr: "error: osg/Node.cpp: compilation failed".to_string(),
            });
        }
        Ok(StepOutput {
            stdout: "[100%] Built target osg\n".to_string(),
            stderr: String::new(),
        })
    }

    fn install(&self, build: &ConfiguredBuild) -> Result<StepOutput> {
        *self.install_calls.lock().unwrap() += 1;
        let prefix = &build.install_prefix;
        fs::create_dir_all(prefix.join("lib"))?;
        fs::create_dir_all(prefix.join("include/osg"))?;
        fs::write(prefix.join("lib/libosg.a"), b"")?;
        fs::write(prefix.join("lib/libOpenThreads.a"), b"")?;
        fs::write(prefix.join("include/osg/Version"), b"")?;
        Ok(StepOutput::default())
    }
}

/// A kitchen wired to mocks, plus the directories it uses
pub struct TestKitchen {
    pub kitchen: Kitchen,
    pub tool: Arc<MockBuildTool>,
    pub fetcher: Arc<MockFetcher>,
    pub cache: TempDir,
    pub package: TempDir,
}

pub fn test_kitchen(tool: MockBuildTool, archive: Vec<u8>) -> TestKitchen {
    let cache = tempfile::tempdir().unwrap();
    let package = tempfile::tempdir().unwrap();
    let tool = Arc::new(tool);
    let fetcher = Arc::new(MockFetcher::new(archive));

    let mut config = KitchenConfig::offline_host(cache.path());
    config.jobs = 2;

    let kitchen = Kitchen::new(config)
        .with_build_tool(tool.clone())
        .with_fetcher(fetcher.clone())
        .with_host_linux(false);

    TestKitchen {
        kitchen,
        tool,
        fetcher,
        cache,
        package,
    }
}

/// A package tool that reports nothing installed and fails every install
#[derive(Default)]
pub struct BrokenPackageTool {
    pub install_calls: Mutex<Vec<String>>,
}

impl SystemPackageTool for BrokenPackageTool {
    fn name(&self) -> &str {
        "broken"
    }

    fn is_installed(&self, _package: &str) -> Result<bool> {
        Ok(false)
    }

    fn install(&self, package: &str) -> Result<()> {
        self.install_calls.lock().unwrap().push(package.to_string());
        Err(Error::BuildFailed {
            step: "apt-get install".to_string(),
            code: Some(100),
            stderr: format!("E: Unable to locate package {}", package),
        })
    }
}

/// A kitchen on a Linux host with system requirements enabled
///
/// With no `package_tool`, detection is turned off as well.
pub fn linux_host_kitchen(
    archive: Vec<u8>,
    package_tool: Option<Arc<dyn SystemPackageTool>>,
) -> TestKitchen {
    let cache = tempfile::tempdir().unwrap();
    let package = tempfile::tempdir().unwrap();
    let tool = Arc::new(MockBuildTool::default());
    let fetcher = Arc::new(MockFetcher::new(archive));

    let mut config = KitchenConfig::with_source_cache(cache.path());
    config.sysreq_mode = SysreqMode::Enabled;
    config.jobs = 2;

    let kitchen = Kitchen::new(config)
        .with_build_tool(tool.clone())
        .with_fetcher(fetcher.clone())
        .with_host_linux(true);
    let kitchen = match package_tool {
        Some(package_tool) => kitchen.with_package_tool(package_tool),
        None => kitchen.without_package_tool(),
    };

    TestKitchen {
        kitchen,
        tool,
        fetcher,
        cache,
        package,
    }
}
