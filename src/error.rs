// src/error.rs

//! Error types for recipe evaluation and cooking

use thiserror::Error;

/// Errors produced while evaluating or cooking the recipe
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O failure with context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Source download failed
    #[error("Download error: {0}")]
    DownloadError(String),

    /// Malformed input (profile, reference, checksum, archive)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Expected file or directory missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Downloaded or cached archive does not match the declared hash
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// Option name not declared by the recipe
    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    /// Option declared by the recipe but removed for this configuration
    #[error("Option '{0}' is not defined for this configuration")]
    OptionNotDefined(String),

    /// Invalid option value
    #[error("Invalid value '{value}' for option '{name}'")]
    InvalidOptionValue { name: String, value: String },

    /// Unknown setting key or value
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// The same requirement was declared twice
    #[error("Duplicate requirement: {0}")]
    DuplicateRequirement(String),

    /// Build tool step exited unsuccessfully
    #[error("{step} step failed with exit code {code:?}\n{stderr}")]
    BuildFailed {
        step: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A cook phase was invoked before its predecessor completed
    #[error("Cannot run {requested} phase: {required} phase has not completed")]
    PhaseOrder {
        requested: &'static str,
        required: &'static str,
    },

    /// A cook phase was invoked after it already ran
    #[error("{0} phase has already run")]
    PhaseRepeated(&'static str),

    /// Initialization failure (HTTP client, external tools)
    #[error("Initialization error: {0}")]
    InitError(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
