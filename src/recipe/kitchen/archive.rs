// src/recipe/kitchen/archive.rs

//! Archive and source file utilities for the Kitchen

use crate::error::{Error, Result};
use crate::hash::{self, VerifyFileError};
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Buffer size for streaming downloads
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Something that can place the bytes behind a URL into a file
///
/// The Kitchen verifies whatever the fetcher wrote, so implementations do
/// not check digests themselves.
pub trait SourceFetcher: Send + Sync {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP(S) downloader with a progress bar
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given connect/read timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("osg-recipe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

fn create_progress_bar(size: u64, name: &str) -> ProgressBar {
    let pb = ProgressBar::new(size);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(name.to_string());
    pb
}

impl SourceFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        info!("Downloading {} to {}", url, dest.display());

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to download {}: {e}", url)))?;

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let total_size = response.content_length().unwrap_or(0);
        let name = url.rsplit('/').next().unwrap_or(url);
        let pb = create_progress_bar(total_size, name);

        let mut file = File::create(dest).map_err(|e| {
            Error::IoError(format!("Failed to create file {}: {e}", dest.display()))
        })?;

        let mut downloaded: u64 = 0;
        let mut buffer = vec![0u8; STREAM_BUFFER_SIZE];
        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| Error::DownloadError(format!("Failed to read response: {e}")))?;
            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])
                .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;
            downloaded += bytes_read as u64;

            pb.set_position(downloaded);
        }
        file.flush()?;

        pb.finish_with_message(format!("{} [done]", name));
        info!("Downloaded {} bytes", downloaded);

        Ok(())
    }
}

/// Verify a file against an expected SHA-256
pub fn verify_file_checksum(path: &Path, expected: &str) -> Result<()> {
    debug!("Verifying checksum for {}", path.display());

    hash::verify_file(path, expected).map_err(|e| match e {
        VerifyFileError::Io(e) => {
            Error::IoError(format!("Failed to read {}: {}", path.display(), e))
        }
        VerifyFileError::Mismatch(e) => Error::ChecksumMismatch {
            expected: e.expected,
            actual: e.actual,
        },
    })?;

    debug!("Checksum verified: {}", expected);
    Ok(())
}

/// Extract a gzip-compressed tarball into `dest`
///
/// Entries that would land outside `dest` are skipped.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let filename = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if !(filename.ends_with(".tar.gz") || filename.ends_with(".tgz")) {
        return Err(Error::ParseError(format!(
            "Unknown archive format: {}",
            filename
        )));
    }

    fs::create_dir_all(dest)?;

    let file = File::open(archive).map_err(|e| {
        Error::IoError(format!("Failed to open archive {}: {e}", archive.display()))
    })?;
    let mut tarball = tar::Archive::new(GzDecoder::new(file));

    let entries = tarball
        .entries()
        .map_err(|e| Error::IoError(format!("Failed to read archive {}: {e}", filename)))?;

    let mut count = 0usize;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| Error::IoError(format!("Corrupt archive {}: {e}", filename)))?;

        let unpacked = entry
            .unpack_in(dest)
            .map_err(|e| Error::IoError(format!("Failed to extract from {}: {e}", filename)))?;

        if unpacked {
            count += 1;
        } else {
            let path = entry
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            warn!("Skipping archive entry outside destination: {}", path);
        }
    }

    debug!("Extracted {} entries from {}", count, filename);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn write_tarball(path: &Path, files: &[(&str, &[u8])]) {
        let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_extract_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("src.tar.gz");
        write_tarball(
            &archive,
            &[
                ("top/CMakeLists.txt", &b"project(x)\n"[..]),
                ("top/LICENSE.txt", &b"license\n"[..]),
            ],
        );

        let dest = tmp.path().join("out");
        extract_archive(&archive, &dest).unwrap();
        assert_eq!(
            fs::read_to_string(dest.join("top/CMakeLists.txt")).unwrap(),
            "project(x)\n"
        );
        assert!(dest.join("top/LICENSE.txt").is_file());
    }

    #[test]
    fn test_extract_archive_unknown_format() {
        let result = extract_archive(Path::new("file.unknown"), Path::new("/tmp"));
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_corrupt_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("bad.tar.gz");
        fs::write(&archive, b"definitely not gzip").unwrap();
        assert!(extract_archive(&archive, &tmp.path().join("out")).is_err());
    }

    #[test]
    fn test_verify_file_checksum() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data");
        fs::write(&path, b"hello world").unwrap();

        verify_file_checksum(
            &path,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
        )
        .unwrap();

        let err = verify_file_checksum(&path, &"0".repeat(64)).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));

        let err = verify_file_checksum(&tmp.path().join("missing"), &"0".repeat(64)).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
