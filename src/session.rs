// src/session.rs

//! Global application context
//!
//! One [`Session`] lives for the whole process: configuration, the output
//! sink (which carries the current exit status), the repository-manager
//! collaborator, and the ambient facts conditions check against. Wrapper
//! methods hand the sink and the manager to each other so commands make one
//! call per delegation.

use url::Url;

use crate::config::Config;
use crate::output::Output;
use crate::repository::{
    CommonProperties, ProbePolicy, RepoError, RepoManager, RepoProperties, SearchQuery,
};

pub struct Session {
    pub config: Config,
    pub out: Output,
    repos: Box<dyn RepoManager>,
    /// Whether the process runs with an effective uid of root.
    pub root_user: bool,
}

impl Session {
    pub fn new(config: Config, out: Output, repos: Box<dyn RepoManager>) -> Self {
        let root_user = nix::unistd::geteuid().is_root();
        Self {
            config,
            out,
            repos,
            root_user,
        }
    }

    /// The current exit status recorded on the output sink.
    pub fn exit_code(&self) -> i32 {
        self.out.exit_code()
    }

    /// Warm the repository manager; standard command setup.
    pub fn prepare(&mut self) -> Result<(), RepoError> {
        let Self { out, repos, .. } = self;
        repos.attach(out)
    }

    /// Drop the repository manager's cached state.
    pub fn reset_repo_manager(&mut self) {
        self.repos.reset();
    }

    pub fn add_repo_from_file(
        &mut self,
        path: &str,
        common: &CommonProperties,
        props: &RepoProperties,
        probe: ProbePolicy,
    ) -> Result<(), RepoError> {
        let Self { out, repos, .. } = self;
        repos.add_repo_from_file(out, path, common, props, probe)
    }

    pub fn add_repo_by_url(
        &mut self,
        url: &Url,
        alias: &str,
        common: &CommonProperties,
        props: &RepoProperties,
        probe: ProbePolicy,
    ) -> Result<(), RepoError> {
        let Self { out, repos, .. } = self;
        repos.add_repo_by_url(out, url, alias, common, props, probe)
    }

    pub fn load_trusted_keys(&mut self) -> Result<(), RepoError> {
        let Self { out, repos, .. } = self;
        repos.load_trusted_keys(out)
    }

    pub fn search(&mut self, query: &SearchQuery) -> Result<(), RepoError> {
        let Self { out, repos, .. } = self;
        repos.search(out, query)
    }
}
