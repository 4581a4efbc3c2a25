// src/recipe/source.rs

//! Source archive descriptor

use serde::Serialize;

/// Archive name prefix used by upstream release tags
pub const ARCHIVE_PREFIX: &str = "OpenSceneGraph";

/// SHA-256 of the upstream release archive
pub const ARCHIVE_SHA256: &str =
    "aea196550f02974d6d09291c5d83b51ca6a03b3767e234a8c0e21322927d1e12";

/// Canonical directory the extracted sources are renamed to
pub const SOURCE_SUBFOLDER: &str = "source_subfolder";

/// Out-of-source build directory
pub const BUILD_SUBFOLDER: &str = "build_subfolder";

/// Where the source comes from and how to verify and lay it out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    /// Archive URL
    pub url: String,
    /// Expected SHA-256 of the archive
    pub sha256: String,
    /// Top-level directory produced by extraction
    pub extracted_dir: String,
    /// Name the extracted directory is renamed to
    pub subfolder: String,
}

impl SourceDescriptor {
    /// Build the descriptor for an upstream release
    ///
    /// URL: `<homepage>/archive/<prefix>-<version>.tar.gz`; the tag archive
    /// extracts to `<prefix>-<prefix>-<version>`.
    pub fn for_release(homepage: &str, version: &str) -> Self {
        Self {
            url: format!(
                "{}/archive/{}-{}.tar.gz",
                homepage.trim_end_matches('/'),
                ARCHIVE_PREFIX,
                version
            ),
            sha256: ARCHIVE_SHA256.to_string(),
            extracted_dir: format!("{}-{}-{}", ARCHIVE_PREFIX, ARCHIVE_PREFIX, version),
            subfolder: SOURCE_SUBFOLDER.to_string(),
        }
    }

    /// Archive filename taken from the URL
    pub fn archive_filename(&self) -> &str {
        self.url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("source.tar.gz")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOMEPAGE: &str = "https://github.com/openscenegraph/OpenSceneGraph";

    #[test]
    fn test_release_url() {
        let source = SourceDescriptor::for_release(HOMEPAGE, "3.6.5");
        assert_eq!(
            source.url,
            "https://github.com/openscenegraph/OpenSceneGraph/archive/OpenSceneGraph-3.6.5.tar.gz"
        );
        assert_eq!(source.sha256, ARCHIVE_SHA256);
        assert_eq!(source.extracted_dir, "OpenSceneGraph-OpenSceneGraph-3.6.5");
        assert_eq!(source.subfolder, "source_subfolder");
    }

    #[test]
    fn test_trailing_slash_homepage() {
        let a = SourceDescriptor::for_release(HOMEPAGE, "3.6.5");
        let b = SourceDescriptor::for_release(&format!("{}/", HOMEPAGE), "3.6.5");
        assert_eq!(a, b);
    }

    #[test]
    fn test_archive_filename() {
        let source = SourceDescriptor::for_release(HOMEPAGE, "3.6.5");
        assert_eq!(source.archive_filename(), "OpenSceneGraph-3.6.5.tar.gz");
    }
}
