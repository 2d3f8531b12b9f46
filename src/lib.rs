// src/lib.rs

//! Satchel package management front end
//!
//! A CLI skeleton for package management: the dependency resolver, metadata
//! handling and key management live in an external library reached through
//! the repository-manager seam; this crate owns the command framework and
//! the commands built on it.
//!
//! # Architecture
//!
//! - Declarative commands: aliases, documentation, flag descriptors and
//!   preconditions are data; the dispatcher drives the shared
//!   reset → parse → check → execute lifecycle
//! - One session per process: configuration, output sink (carrying the
//!   current exit status) and the repository manager collaborator
//! - Commands translate every failure into a message plus exit code at
//!   their own boundary; nothing unwinds past `execute`

pub mod commands;
pub mod config;
mod error;
pub mod flags;
pub mod output;
pub mod repository;
pub mod session;

pub use config::Config;
pub use error::{
    EXIT_ERR_BUG, EXIT_ERR_INVALID_ARGS, EXIT_ERR_PRIVILEGES, EXIT_ERR_REPO, EXIT_ERR_SYNTAX,
    EXIT_OK, Error, Result,
};
pub use output::{Output, Verbosity};
pub use session::Session;
