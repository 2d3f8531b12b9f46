// src/repository/urls.rs

//! URL interpretation helpers for repository commands
//!
//! Commands only recognize the syntactic shape of what the user typed well
//! enough to route to the right manager call; formats themselves belong to
//! the external library.

use std::path::Path;

use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("invalid URL '{url}': {source}")]
    Parse {
        url: String,
        source: url::ParseError,
    },

    #[error("invalid URL '{0}'")]
    Malformed(String),

    #[error("'{0}' does not name a project")]
    ObsMissingProject(String),
}

/// Interpret a user-supplied string as a URL.
///
/// A bare filesystem path becomes an absolute `file://` URL; anything else
/// that does not parse is an error.
pub fn make_url(raw: &str) -> Result<Url, UrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Empty);
    }
    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let abs = std::path::absolute(Path::new(raw))
                .map_err(|_| UrlError::Malformed(raw.to_string()))?;
            Url::from_file_path(&abs).map_err(|_| UrlError::Malformed(raw.to_string()))
        }
        Err(source) => Err(UrlError::Parse {
            url: raw.to_string(),
            source,
        }),
    }
}

/// Expand an `obs:` URI against the configured base URL.
///
/// `obs:[//]PROJECT[/PLATFORM]` names a build-service project; colons in
/// the project map to the `:/` path form the download server uses, and a
/// missing platform falls back to the configured default.
pub fn make_obs_url(raw: &str, base: &Url, default_platform: &str) -> Result<Url, UrlError> {
    let rest = raw
        .strip_prefix("obs:")
        .ok_or_else(|| UrlError::Malformed(raw.to_string()))?;
    let rest = rest.trim_start_matches('/');
    let mut parts = rest.splitn(2, '/');
    let project = parts
        .next()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| UrlError::ObsMissingProject(raw.to_string()))?;
    let platform = parts
        .next()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .unwrap_or(default_platform);

    let mut url = base.clone();
    let mut path = url.path().trim_end_matches('/').to_string();
    path.push('/');
    path.push_str(&project.replace(':', ":/"));
    path.push('/');
    path.push_str(platform);
    path.push('/');
    url.set_path(&path);
    Ok(url)
}

/// Syntactic test: does this argument refer to a `.repo` file?
///
/// Looks only at the path component of a URL (or at the raw string when it
/// is not a URL), never at file contents.
pub fn is_repo_file(raw: &str) -> bool {
    let path = match Url::parse(raw) {
        Ok(url) => url.path().to_string(),
        Err(_) => raw.to_string(),
    };
    path.ends_with(".repo")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://download.opensuse.org/repositories/").unwrap()
    }

    #[test]
    fn test_make_url_parses_http() {
        let url = make_url("http://example.com/repo").unwrap();
        assert_eq!(url.as_str(), "http://example.com/repo");
    }

    #[test]
    fn test_make_url_turns_bare_path_into_file_url() {
        let url = make_url("/srv/repo").unwrap();
        assert_eq!(url.scheme(), "file");
        assert_eq!(url.path(), "/srv/repo");
    }

    #[test]
    fn test_make_url_rejects_empty_and_garbage() {
        assert_eq!(make_url("   "), Err(UrlError::Empty));
        assert!(matches!(make_url("http://"), Err(UrlError::Parse { .. })));
    }

    #[test]
    fn test_obs_url_project_and_platform() {
        let url = make_obs_url("obs://server:http/openSUSE_Tumbleweed", &base(), "standard").unwrap();
        assert_eq!(
            url.as_str(),
            "https://download.opensuse.org/repositories/server:/http/openSUSE_Tumbleweed/"
        );
    }

    #[test]
    fn test_obs_url_default_platform() {
        let url = make_obs_url("obs://devel:tools", &base(), "openSUSE_Factory").unwrap();
        assert_eq!(
            url.as_str(),
            "https://download.opensuse.org/repositories/devel:/tools/openSUSE_Factory/"
        );
    }

    #[test]
    fn test_obs_url_single_slash_form() {
        let url = make_obs_url("obs:/home:user/standard", &base(), "standard").unwrap();
        assert_eq!(
            url.as_str(),
            "https://download.opensuse.org/repositories/home:/user/standard/"
        );
    }

    #[test]
    fn test_obs_url_missing_project() {
        assert!(matches!(
            make_obs_url("obs://", &base(), "standard"),
            Err(UrlError::ObsMissingProject(_))
        ));
    }

    #[test]
    fn test_is_repo_file() {
        assert!(is_repo_file("foo.repo"));
        assert!(is_repo_file("./local/foo.repo"));
        assert!(is_repo_file("http://example.com/project/foo.repo"));
        assert!(is_repo_file("http://example.com/foo.repo?token=abc"));
        assert!(!is_repo_file("http://example.com/repo"));
        assert!(!is_repo_file("myalias"));
    }
}
