// src/repository/mod.rs

//! Repository manager seam
//!
//! The heavy lifting of package management (metadata handling, solving,
//! key management) lives in an external library. This module defines the
//! narrow interface satchel's commands call into, the data carried across
//! it, and a thin built-in implementation good enough to run the binary
//! against.

mod manager;
pub mod urls;

pub use manager::{RepoEntry, SystemRepoManager};

use thiserror::Error;
use url::Url;

use crate::output::Output;

/// Errors raised by the repository manager
#[derive(Error, Debug)]
pub enum RepoError {
    /// A `.repo` file declared a repository type the manager does not know
    #[error("unknown repository type '{0}'")]
    UnknownType(String),

    /// A repository with this alias is already defined
    #[error("repository '{0}' already exists")]
    AlreadyExists(String),

    /// A `.repo` file could not be interpreted
    #[error("failed to parse repository definition: {0}")]
    Parse(String),

    /// Probing determined the URI is not reachable
    #[error("repository '{0}' is not reachable")]
    Unreachable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Repository list could not be decoded
    #[error("failed to read repository list: {0}")]
    StoreDecode(#[from] toml::de::Error),

    /// Repository list could not be encoded
    #[error("failed to write repository list: {0}")]
    StoreEncode(#[from] toml::ser::Error),
}

/// Whether to probe a repository URI before adding it.
///
/// `Unspecified` defers to the `probe_on_add` configuration setting; the
/// command layer never collapses it to a forced value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbePolicy {
    ForceEnable,
    ForceDisable,
    #[default]
    Unspecified,
}

/// Properties shared by repository and service definitions.
///
/// `None` fields defer to the manager's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonProperties {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub autorefresh: Option<bool>,
}

/// Properties specific to repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoProperties {
    pub priority: Option<u32>,
    pub keep_packages: Option<bool>,
}

/// What a search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAttribute {
    Name,
    Provides,
}

/// How search terms are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Substring,
    Exact,
}

/// One search request delegated to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub attribute: SearchAttribute,
    pub mode: MatchMode,
    pub terms: Vec<String>,
}

/// The repository manager collaborator.
///
/// All operations report user-facing text through the output sink; partial
/// successes are recorded as a non-OK exit status on the sink while the
/// call itself still returns `Ok`.
pub trait RepoManager {
    /// Warm any cached state. The dispatcher calls this during standard
    /// command setup.
    fn attach(&mut self, out: &mut Output) -> Result<(), RepoError>;

    /// Drop cached state so the next operation sees the system fresh.
    fn reset(&mut self);

    /// Add every repository defined in a `.repo` file.
    fn add_repo_from_file(
        &mut self,
        out: &mut Output,
        path: &str,
        common: &CommonProperties,
        props: &RepoProperties,
        probe: ProbePolicy,
    ) -> Result<(), RepoError>;

    /// Add a single repository under `alias`.
    fn add_repo_by_url(
        &mut self,
        out: &mut Output,
        url: &Url,
        alias: &str,
        common: &CommonProperties,
        props: &RepoProperties,
        probe: ProbePolicy,
    ) -> Result<(), RepoError>;

    /// One-time system setup before remote operations: make trusted keys
    /// available to the verification layer.
    fn load_trusted_keys(&mut self, out: &mut Output) -> Result<(), RepoError>;

    /// Run a resolver search with the given predicate and match mode.
    fn search(&mut self, out: &mut Output, query: &SearchQuery) -> Result<(), RepoError>;
}
