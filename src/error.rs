// src/error.rs

//! Crate-wide error type and process exit codes

use thiserror::Error;

use crate::flags::FlagError;
use crate::repository::RepoError;

/// Result type for satchel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Everything went fine.
pub const EXIT_OK: i32 = 0;
/// Unexpected internal fault; a bug worth reporting.
pub const EXIT_ERR_BUG: i32 = 1;
/// Unknown command or malformed command line options.
pub const EXIT_ERR_SYNTAX: i32 = 2;
/// Arguments had the wrong count or shape for the invoked command.
pub const EXIT_ERR_INVALID_ARGS: i32 = 3;
/// A repository-manager operation failed.
pub const EXIT_ERR_REPO: i32 = 4;
/// The command requires privileges the caller does not have.
pub const EXIT_ERR_PRIVILEGES: i32 = 5;

/// Errors that can occur outside a command's own exit-code handling
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    ConfigRead(#[source] std::io::Error),

    /// Configuration file is not valid TOML
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Command line option parsing failed
    #[error(transparent)]
    Flag(#[from] FlagError),

    /// Repository manager operation failed
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
