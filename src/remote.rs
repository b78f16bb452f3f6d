//! Repository identity derived from a git remote URL.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{ReleaseError, Result};
use crate::git::VersionControl;

/// Remote used when the current branch has no configured upstream remote.
pub const DEFAULT_REMOTE: &str = "origin";

const GITHUB_HOST: &str = "github.com";
const GITHUB_API: &str = "https://api.github.com";

// user@host:path, the scp-like form git accepts for ssh remotes
static SCP_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^@/:\s]+@)?(?P<host>[^@/:\s]+):(?P<path>[^\s]+)$").expect("valid regex")
});

/// Structured identity of the repository a remote points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentity {
    pub host: String,
    /// Everything before the project, including nested groups (`group/subgroup`)
    pub owner: String,
    pub project: String,
    pub protocol: String,
    /// The remote URL as configured
    pub remote: String,
    /// `owner/project`
    pub repository: String,
}

impl RepositoryIdentity {
    /// REST endpoint of the forge hosting this repository.
    ///
    /// An explicit override wins; github.com maps to the public API and any
    /// other host is treated as a GitHub Enterprise server.
    pub fn api_base(&self, override_url: Option<&str>) -> String {
        if let Some(url) = override_url {
            return url.trim_end_matches('/').to_string();
        }
        if self.host.eq_ignore_ascii_case(GITHUB_HOST) {
            GITHUB_API.to_string()
        } else {
            format!("https://{}/api/v3", self.host)
        }
    }
}

/// Parses a remote URL into a [`RepositoryIdentity`].
///
/// Accepts scp-like ssh remotes (`git@host:owner/project.git`) as well as
/// `ssh://`, `git+ssh://`, `git://` and `http(s)://` URLs.
pub fn parse_remote_url(url: &str) -> Result<RepositoryIdentity> {
    let remote = url.trim();
    if remote.is_empty() {
        return Err(ReleaseError::remote_url(url, "empty URL"));
    }

    let (host, protocol, path) = if remote.contains("://") {
        let parsed = Url::parse(remote).map_err(|e| ReleaseError::remote_url(remote, e.to_string()))?;
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ReleaseError::remote_url(remote, "missing host"))?
            .to_string();
        let protocol = match parsed.scheme() {
            "git+ssh" | "ssh+git" => "ssh".to_string(),
            other => other.to_string(),
        };
        (host, protocol, parsed.path().to_string())
    } else if let Some(caps) = SCP_LIKE.captures(remote) {
        (
            caps["host"].to_string(),
            "ssh".to_string(),
            caps["path"].to_string(),
        )
    } else {
        return Err(ReleaseError::remote_url(remote, "unrecognized remote format"));
    };

    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let project = segments
        .pop()
        .map(|last| last.strip_suffix(".git").unwrap_or(last))
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ReleaseError::remote_url(remote, "missing project name"))?
        .to_string();
    if segments.is_empty() {
        return Err(ReleaseError::remote_url(remote, "missing owner"));
    }
    let owner = segments.join("/");

    Ok(RepositoryIdentity {
        repository: format!("{}/{}", owner, project),
        host,
        owner,
        project,
        protocol,
        remote: remote.to_string(),
    })
}

/// Name of the remote releases are pushed to: the current branch's remote,
/// or `origin` when there is none.
pub fn release_remote(vcs: &dyn VersionControl) -> Result<String> {
    let remote = match vcs.current_branch()? {
        Some(branch) => vcs.remote_for_branch(&branch)?,
        None => None,
    };
    Ok(remote.unwrap_or_else(|| DEFAULT_REMOTE.to_string()))
}

/// Resolves the identity of the repository behind the release remote.
pub fn resolve_repository(vcs: &dyn VersionControl) -> Result<RepositoryIdentity> {
    let remote = release_remote(vcs)?;
    let url = vcs.remote_url(&remote)?;
    tracing::debug!(remote = %remote, url = %url, "resolved release remote");
    parse_remote_url(&url)
}
