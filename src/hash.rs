// src/hash.rs

//! SHA-256 hashing for source archive integrity
//!
//! Source archives are pinned by SHA-256. Digests are handled as lowercase
//! hex strings; [`Sha256Digest`] validates that form at the boundary so the
//! rest of the crate can compare strings directly.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Length of a SHA-256 digest as a hex string
pub const SHA256_HEX_LEN: usize = 64;

/// Digest parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// Hash string has the wrong length
    InvalidLength { expected: usize, got: usize },
    /// Hash string contains invalid hex characters
    InvalidHex(String),
}

impl fmt::Display for DigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { expected, got } => {
                write!(f, "invalid sha256 length: expected {}, got {}", expected, got)
            }
            Self::InvalidHex(s) => write!(f, "invalid hex in sha256: {}", s),
        }
    }
}

impl std::error::Error for DigestError {}

/// A validated SHA-256 digest in lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Validate and normalize a hex digest
    pub fn new(value: impl Into<String>) -> Result<Self, DigestError> {
        let value = value.into();

        if value.len() != SHA256_HEX_LEN {
            return Err(DigestError::InvalidLength {
                expected: SHA256_HEX_LEN,
                got: value.len(),
            });
        }

        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DigestError::InvalidHex(value));
        }

        Ok(Self(value.to_lowercase()))
    }

    /// Get the digest as a hex string
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cache key used by the source cache (`sha256_<hex>`)
    pub fn cache_key(&self) -> String {
        format!("sha256_{}", self.0)
    }
}

impl FromStr for Sha256Digest {
    type Err = DigestError;

    /// Accepts both bare hex and the `sha256:` prefixed form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.strip_prefix("sha256:").unwrap_or(s))
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute SHA-256 of a byte slice
pub fn sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Compute SHA-256 of data from a reader
pub fn hash_reader<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute SHA-256 of a file, streaming its content
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    hash_reader(&mut file)
}

/// Verification result error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyError {
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sha256 mismatch: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for VerifyError {}

/// Verify bytes match an expected digest
///
/// # Example
/// ```
/// use osg_recipe::hash::verify_bytes;
///
/// let data = b"hello world";
/// let hash = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
/// assert!(verify_bytes(data, hash).is_ok());
/// ```
pub fn verify_bytes(data: &[u8], expected: &str) -> Result<(), VerifyError> {
    let actual = sha256(data);
    if actual == expected.to_lowercase() {
        Ok(())
    } else {
        Err(VerifyError {
            expected: expected.to_string(),
            actual,
        })
    }
}

/// Failure to verify a file
///
/// Keeps read errors apart from digest mismatches, so an unreadable file is
/// never reported as corrupt.
#[derive(Debug)]
pub enum VerifyFileError {
    Io(io::Error),
    Mismatch(VerifyError),
}

impl fmt::Display for VerifyFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read file: {}", e),
            Self::Mismatch(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for VerifyFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Mismatch(e) => Some(e),
        }
    }
}

/// Verify a file matches an expected digest
///
/// Streams the file content to avoid loading it entirely into memory.
pub fn verify_file(path: &Path, expected: &str) -> Result<(), VerifyFileError> {
    let actual = hash_file(path).map_err(VerifyFileError::Io)?;

    if actual == expected.to_lowercase() {
        Ok(())
    } else {
        Err(VerifyFileError::Mismatch(VerifyError {
            expected: expected.to_string(),
            actual,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            sha256(b"Hello, World!"),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[test]
    fn test_hash_reader_matches_bytes() {
        let data = b"Hello, World!";
        let mut cursor = std::io::Cursor::new(data);
        assert_eq!(hash_reader(&mut cursor).unwrap(), sha256(data));
    }

    #[test]
    fn test_digest_validation() {
        assert!(
            Sha256Digest::new("dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f")
                .is_ok()
        );
        assert!(matches!(
            Sha256Digest::new("abc123"),
            Err(DigestError::InvalidLength { .. })
        ));
        assert!(matches!(
            Sha256Digest::new("gggg6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"),
            Err(DigestError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_digest_prefixed_and_case() {
        let digest: Sha256Digest =
            "sha256:DFFD6021BB2BD5B0AF676290809EC3A53191DD81C7F70A4B28688A362182986F"
                .parse()
                .unwrap();
        assert_eq!(
            digest.as_str(),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        assert!(digest.cache_key().starts_with("sha256_dffd"));
    }

    #[test]
    fn test_verify_bytes() {
        let data = b"hello world";
        let hash = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        assert!(verify_bytes(data, hash).is_ok());
        assert!(verify_bytes(data, &hash.to_uppercase()).is_ok());

        let wrong = "0000000000000000000000000000000000000000000000000000000000000000";
        let err = verify_bytes(data, wrong).unwrap_err();
        assert_eq!(err.expected, wrong);
        assert_eq!(err.actual, hash);
    }

    #[test]
    fn test_verify_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        let hash = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        assert!(verify_file(file.path(), hash).is_ok());
        assert!(matches!(
            verify_file(file.path(), &"0".repeat(64)),
            Err(VerifyFileError::Mismatch(_))
        ));
    }

    #[test]
    fn test_verify_missing_file() {
        let err = verify_file(Path::new("/nonexistent/archive.tar.gz"), &"0".repeat(64))
            .unwrap_err();
        match err {
            VerifyFileError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {}", other),
        }
    }
}
