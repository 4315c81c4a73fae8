//! Error types for pastename.

use thiserror::Error;

/// Top-level result type for pastename operations.
pub type Result<T> = std::result::Result<T, PasteNameError>;

/// Top-level error type for pastename.
#[derive(Debug, Error)]
pub enum PasteNameError {
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("config error: {0}")]
    Config(String),

    #[error("vault error: {0}")]
    Vault(String),

    #[error("failed to rename {from} to {to}: {reason}")]
    Rename {
        from: String,
        to: String,
        reason: String,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors raised when configuration is turned into a naming or filtering policy.
///
/// These are rejected up front so that the deduplicator and the attachment
/// filter never see malformed input.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("duplicate number delimiter must not be empty")]
    EmptyDelimiter,

    #[error("duplicate number delimiter '{delimiter}' contains '{ch}', which is not allowed in file names")]
    IllegalDelimiterChar { delimiter: String, ch: char },

    #[error("invalid extension pattern '{pattern}': {reason}")]
    InvalidExtensionPattern { pattern: String, reason: String },
}
