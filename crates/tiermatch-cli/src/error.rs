//! Error types for the CLI application.

use thiserror::Error;
use tiermatch_domain::DomainError;
use tiermatch_sheet::SheetError;
use tiermatch_store::StoreError;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected ranking operation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Sheet error
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No identity selected yet
    #[error("No identity selected. Use 'identity <NAME>' first.")]
    NoIdentity,
}
