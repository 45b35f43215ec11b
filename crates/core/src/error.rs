//! Error types for kmsctl-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for kmsctl-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for kmsctl-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file or session error
    #[error("configuration error: {0}")]
    Config(String),

    /// No KMS alias matches the requested name
    #[error("kms alias does not exist: {0}")]
    AliasNotFound(String),

    /// The bucket does not exist
    #[error("the bucket: {0} does not exist")]
    BucketNotFound(String),

    /// The bucket still holds objects and force was not requested
    #[error("the bucket: {0} is not empty, either force (--force) deletion or empty the bucket")]
    BucketNotEmpty(String),

    /// A key alias or bucket with this name already exists
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The object filter is not a valid regular expression
    #[error("the filter: {pattern} is invalid, message: {message}")]
    InvalidFilter { pattern: String, message: String },

    /// Upload was invoked without any local paths
    #[error("you have not specified any files to upload")]
    NoInput,

    /// The external editor could not be run or exited unsuccessfully
    #[error("editor error: {0}")]
    Editor(String),

    /// Failure surfaced by the object storage or key management backend
    #[error("provider error: {0}")]
    Provider(String),

    /// Object or resource missing on the provider side
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// URL parsing error
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_)
            | Error::InvalidFilter { .. }
            | Error::NoInput
            | Error::InvalidUrl(_)
            | Error::TomlParse(_) => 2, // UsageError
            Error::Provider(_) => 3, // ProviderError
            Error::AliasNotFound(_) | Error::BucketNotFound(_) | Error::NotFound(_) => 5, // NotFound
            Error::AlreadyExists(_) | Error::BucketNotEmpty(_) => 6, // Conflict
            _ => 1, // GeneralError
        }
    }

    /// Prefix a provider failure with what was being attempted
    ///
    /// Classified errors (not found, conflicts) pass through unchanged so
    /// they keep their exit code.
    pub fn context(self, context: impl FnOnce() -> String) -> Self {
        match self {
            Error::Provider(message) => {
                Error::Provider(format!("{}, error: {message}", context()))
            }
            other => other,
        }
    }
}
