#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use spec_rewrite_core::RewriteError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Failure raised by the rewrite engine.
    #[display("{}", _0)]
    Core(RewriteError),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

impl CliError {
    /// Machine-readable reason reported to callers.
    pub fn reason(&self) -> &'static str {
        match self {
            CliError::Io(_) => "IoError",
            CliError::Core(err) => err.code(),
            CliError::General(_) => "Failed",
        }
    }
}

/// Manual implementation of the standard Error trait.
///
/// `General(String)` carries no source, so `derive(Error)` is not used.
impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            CliError::Core(err) => Some(err),
            CliError::General(_) => None,
        }
    }
}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
