// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use url::Url;

use satchel::config::Config;
use satchel::output::{Output, Verbosity};
use satchel::repository::{
    CommonProperties, ProbePolicy, RepoError, RepoManager, RepoProperties, SearchQuery,
};
use satchel::session::Session;

/// Shared buffer implementing Write, for capturing sink output.
#[derive(Clone, Default)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Everything the recording manager saw.
#[derive(Default)]
pub struct Recorded {
    pub attaches: usize,
    pub resets: usize,
    pub from_file: Vec<(String, ProbePolicy)>,
    pub by_url: Vec<(String, String, CommonProperties, RepoProperties, ProbePolicy)>,
    pub keys_loaded: usize,
    pub searches: Vec<SearchQuery>,
}

/// Seam double: records delegated calls instead of doing work.
pub struct RecordingManager(pub Rc<RefCell<Recorded>>);

impl RepoManager for RecordingManager {
    fn attach(&mut self, _out: &mut Output) -> Result<(), RepoError> {
        self.0.borrow_mut().attaches += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.0.borrow_mut().resets += 1;
    }

    fn add_repo_from_file(
        &mut self,
        _out: &mut Output,
        path: &str,
        _common: &CommonProperties,
        _props: &RepoProperties,
        probe: ProbePolicy,
    ) -> Result<(), RepoError> {
        self.0.borrow_mut().from_file.push((path.to_string(), probe));
        Ok(())
    }

    fn add_repo_by_url(
        &mut self,
        _out: &mut Output,
        url: &Url,
        alias: &str,
        common: &CommonProperties,
        props: &RepoProperties,
        probe: ProbePolicy,
    ) -> Result<(), RepoError> {
        self.0.borrow_mut().by_url.push((
            url.to_string(),
            alias.to_string(),
            common.clone(),
            props.clone(),
            probe,
        ));
        Ok(())
    }

    fn load_trusted_keys(&mut self, _out: &mut Output) -> Result<(), RepoError> {
        self.0.borrow_mut().keys_loaded += 1;
        Ok(())
    }

    fn search(&mut self, _out: &mut Output, query: &SearchQuery) -> Result<(), RepoError> {
        self.0.borrow_mut().searches.push(query.clone());
        Ok(())
    }
}

/// A root session over a recording manager and captured output.
pub fn recording_session() -> (Session, Rc<RefCell<Recorded>>, Buffer, Buffer) {
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    let stdout = Buffer::default();
    let stderr = Buffer::default();
    let out = Output::with_writers(
        Verbosity::Normal,
        Box::new(stdout.clone()),
        Box::new(stderr.clone()),
    );
    let mut session = Session::new(
        Config::default(),
        out,
        Box::new(RecordingManager(recorded.clone())),
    );
    session.root_user = true;
    (session, recorded, stdout, stderr)
}

/// A root session over the real built-in manager, rooted in `dir`.
pub fn system_session(dir: &std::path::Path) -> (Session, Buffer, Buffer) {
    let config = Config {
        repos_file: dir.join("repos.toml"),
        keyring_dir: dir.join("keyring"),
        probe_on_add: false,
        ..Config::default()
    };
    let manager = satchel::repository::SystemRepoManager::new(&config);
    let stdout = Buffer::default();
    let stderr = Buffer::default();
    let out = Output::with_writers(
        Verbosity::Normal,
        Box::new(stdout.clone()),
        Box::new(stderr.clone()),
    );
    let mut session = Session::new(config, out, Box::new(manager));
    session.root_user = true;
    (session, stdout, stderr)
}

pub fn args(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}
