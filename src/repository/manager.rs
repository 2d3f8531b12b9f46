// src/repository/manager.rs

//! Built-in repository manager
//!
//! A deliberately thin implementation of the [`RepoManager`] seam: the
//! repository list is persisted as a TOML file, `.repo` definitions are
//! read just enough to route entries, and probing is a reachability check.
//! Everything deeper (metadata, solving, signatures) belongs to the
//! external library this binary fronts.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::EXIT_ERR_REPO;
use crate::output::{Output, Verbosity};

use super::{
    CommonProperties, ProbePolicy, RepoError, RepoManager, RepoProperties, SearchQuery,
};

/// Timeout for probe requests
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Repository types the metadata layer understands. `.repo` files carrying
/// anything else are rejected before any entry is added.
const KNOWN_TYPES: &[&str] = &["rpm-md", "yast2", "plaindir", "NONE"];

fn default_true() -> bool {
    true
}

fn default_priority() -> u32 {
    99
}

/// One persisted repository definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub alias: String,
    pub baseurl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub autorefresh: bool,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_packages: Option<bool>,
}

impl RepoEntry {
    fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            baseurl: String::new(),
            name: None,
            enabled: true,
            autorefresh: false,
            priority: default_priority(),
            keep_packages: None,
        }
    }

    fn apply(&mut self, common: &CommonProperties, props: &RepoProperties) {
        if let Some(name) = &common.name {
            self.name = Some(name.clone());
        }
        if let Some(enabled) = common.enabled {
            self.enabled = enabled;
        }
        if let Some(autorefresh) = common.autorefresh {
            self.autorefresh = autorefresh;
        }
        if let Some(priority) = props.priority {
            self.priority = priority;
        }
        if let Some(keep) = props.keep_packages {
            self.keep_packages = Some(keep);
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RepoStore {
    #[serde(default)]
    repos: Vec<RepoEntry>,
}

/// Repository manager persisting its list to a TOML file.
pub struct SystemRepoManager {
    repos_file: PathBuf,
    keyring_dir: PathBuf,
    probe_default: bool,
    store: Option<RepoStore>,
}

impl SystemRepoManager {
    pub fn new(config: &Config) -> Self {
        Self {
            repos_file: config.repos_file.clone(),
            keyring_dir: config.keyring_dir.clone(),
            probe_default: config.probe_on_add,
            store: None,
        }
    }

    /// The persisted repository entries, for inspection.
    pub fn entries(&mut self) -> Result<&[RepoEntry], RepoError> {
        Ok(&self.load()?.repos)
    }

    fn load(&mut self) -> Result<&mut RepoStore, RepoError> {
        if self.store.is_none() {
            let store = if self.repos_file.exists() {
                let raw = std::fs::read_to_string(&self.repos_file)?;
                toml::from_str(&raw)?
            } else {
                RepoStore::default()
            };
            self.store = Some(store);
        }
        // populated above
        Ok(self.store.as_mut().unwrap())
    }

    fn save(&mut self) -> Result<(), RepoError> {
        let store = self.load()?;
        let raw = toml::to_string_pretty(&*store)?;
        let path = &self.repos_file;
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, raw)?;
        Ok(())
    }

    fn should_probe(&self, probe: ProbePolicy) -> bool {
        match probe {
            ProbePolicy::ForceEnable => true,
            ProbePolicy::ForceDisable => false,
            ProbePolicy::Unspecified => self.probe_default,
        }
    }

    /// Reachability check for a repository URI.
    fn probe(&self, out: &mut Output, url: &Url) -> Result<(), RepoError> {
        out.info_at(format!("Probing '{url}' ..."), Verbosity::High);
        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| RepoError::Unreachable(url.to_string()))?;
                if path.exists() {
                    Ok(())
                } else {
                    Err(RepoError::Unreachable(url.to_string()))
                }
            }
            "http" | "https" => {
                let client = reqwest::blocking::Client::builder()
                    .timeout(PROBE_TIMEOUT)
                    .build()
                    .map_err(|_| RepoError::Unreachable(url.to_string()))?;
                let response = client
                    .head(url.as_str())
                    .send()
                    .map_err(|_| RepoError::Unreachable(url.to_string()))?;
                if response.status().is_success() {
                    Ok(())
                } else {
                    Err(RepoError::Unreachable(url.to_string()))
                }
            }
            scheme => {
                // unknown transports are left for the refresh to sort out
                debug!(scheme, "skipping probe for unsupported scheme");
                Ok(())
            }
        }
    }

    fn insert(&mut self, entry: RepoEntry) -> Result<(), RepoError> {
        let store = self.load()?;
        if store.repos.iter().any(|r| r.alias == entry.alias) {
            return Err(RepoError::AlreadyExists(entry.alias));
        }
        store.repos.push(entry);
        Ok(())
    }
}

impl RepoManager for SystemRepoManager {
    fn attach(&mut self, out: &mut Output) -> Result<(), RepoError> {
        let count = self.load()?.repos.len();
        debug!(count, "attached repository manager");
        out.info_at(format!("Loaded {count} repositories."), Verbosity::Debug);
        Ok(())
    }

    fn reset(&mut self) {
        debug!("resetting repository manager");
        self.store = None;
    }

    fn add_repo_from_file(
        &mut self,
        out: &mut Output,
        path: &str,
        common: &CommonProperties,
        props: &RepoProperties,
        probe: ProbePolicy,
    ) -> Result<(), RepoError> {
        let content = std::fs::read_to_string(path)?;
        let entries = parse_repo_file(&content)?;
        info!(path, count = entries.len(), "adding repositories from file");

        for mut entry in entries {
            entry.apply(common, props);
            if self.should_probe(probe)
                && let Ok(url) = Url::parse(&entry.baseurl)
                && let Err(e) = self.probe(out, &url)
            {
                out.error(format!("Cannot add repository '{}': {e}", entry.alias));
                out.set_exit_code(EXIT_ERR_REPO);
                continue;
            }
            let alias = entry.alias.clone();
            match self.insert(entry) {
                Ok(()) => out.info(format!("Repository '{alias}' successfully added.")),
                Err(e) => {
                    // keep going; the ambient exit status records the partial failure
                    out.error(format!("Cannot add repository '{alias}': {e}"));
                    out.set_exit_code(EXIT_ERR_REPO);
                }
            }
        }
        self.save()
    }

    fn add_repo_by_url(
        &mut self,
        out: &mut Output,
        url: &Url,
        alias: &str,
        common: &CommonProperties,
        props: &RepoProperties,
        probe: ProbePolicy,
    ) -> Result<(), RepoError> {
        if alias.is_empty() {
            return Err(RepoError::Parse("repository alias cannot be empty".to_string()));
        }
        if self.should_probe(probe) {
            self.probe(out, url)?;
        }
        let mut entry = RepoEntry::new(alias);
        entry.baseurl = url.to_string();
        entry.apply(common, props);
        let enabled = entry.enabled;
        self.insert(entry)?;
        self.save()?;

        info!(alias, url = %url, "added repository");
        out.info(format!("Repository '{alias}' successfully added."));
        out.info_at(
            format!("URI: {url}\nEnabled: {}", if enabled { "Yes" } else { "No" }),
            Verbosity::High,
        );
        Ok(())
    }

    fn load_trusted_keys(&mut self, out: &mut Output) -> Result<(), RepoError> {
        if !self.keyring_dir.exists() {
            debug!(dir = %self.keyring_dir.display(), "no keyring directory");
            return Ok(());
        }
        let mut count = 0usize;
        for entry in std::fs::read_dir(&self.keyring_dir)? {
            let path = entry?.path();
            if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("asc" | "gpg" | "key")
            ) {
                count += 1;
            }
        }
        debug!(count, "loaded trusted keys");
        out.info_at(format!("Loaded {count} trusted keys."), Verbosity::Debug);
        Ok(())
    }

    fn search(&mut self, out: &mut Output, query: &SearchQuery) -> Result<(), RepoError> {
        debug!(?query, "running search");
        if self.load()?.repos.is_empty() {
            out.warning(
                "No repositories defined. Operating only with the installed resolvables. \
                 Nothing can be installed.",
            );
        }
        // with no synchronized metadata there is nothing to match against
        out.info("No matching items found.");
        Ok(())
    }
}

/// Read the sections of a `.repo` file into entries.
///
/// Only the keys this layer routes on are interpreted; everything deeper is
/// the external library's business. An unrecognized `type=` value rejects
/// the whole file.
fn parse_repo_file(content: &str) -> Result<Vec<RepoEntry>, RepoError> {
    let mut entries: Vec<RepoEntry> = Vec::new();
    let mut current: Option<RepoEntry> = None;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let section = section.trim();
            if section.is_empty() {
                return Err(RepoError::Parse(format!("line {}: empty section name", idx + 1)));
            }
            if let Some(done) = current.take() {
                entries.push(done);
            }
            current = Some(RepoEntry::new(section));
        } else if let Some((key, value)) = line.split_once('=') {
            let (key, value) = (key.trim(), value.trim());
            let Some(entry) = current.as_mut() else {
                return Err(RepoError::Parse(format!(
                    "line {}: '{key}' outside of a repository section",
                    idx + 1
                )));
            };
            match key {
                "baseurl" => entry.baseurl = value.to_string(),
                "name" => entry.name = Some(value.to_string()),
                "enabled" => entry.enabled = parse_bool(value, idx)?,
                "autorefresh" => entry.autorefresh = parse_bool(value, idx)?,
                "keeppackages" => entry.keep_packages = Some(parse_bool(value, idx)?),
                "priority" => {
                    entry.priority = value.parse().map_err(|_| {
                        RepoError::Parse(format!("line {}: invalid priority '{value}'", idx + 1))
                    })?;
                }
                "type" => {
                    if !KNOWN_TYPES.contains(&value) {
                        return Err(RepoError::UnknownType(value.to_string()));
                    }
                }
                // verification keys are the signature layer's concern
                "gpgcheck" | "gpgkey" | "path" => {}
                other => debug!(key = other, "ignoring unknown .repo key"),
            }
        } else {
            return Err(RepoError::Parse(format!(
                "line {}: expected 'key = value', got '{line}'",
                idx + 1
            )));
        }
    }
    if let Some(done) = current.take() {
        entries.push(done);
    }

    if entries.is_empty() {
        return Err(RepoError::Parse("no repository sections found".to_string()));
    }
    for entry in &entries {
        if entry.baseurl.is_empty() {
            return Err(RepoError::Parse(format!(
                "repository '{}' has no baseurl",
                entry.alias
            )));
        }
    }
    Ok(entries)
}

fn parse_bool(value: &str, idx: usize) -> Result<bool, RepoError> {
    match value {
        "1" | "yes" | "true" => Ok(true),
        "0" | "no" | "false" => Ok(false),
        other => Err(RepoError::Parse(format!(
            "line {}: expected a boolean, got '{other}'",
            idx + 1
        ))),
    }
}
