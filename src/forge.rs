//! Publishing releases to the code forge.

use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::error::{ReleaseError, Result};
use crate::payload::ReleaseRequest;

const USER_AGENT: &str = concat!("changeset-release/", env!("CARGO_PKG_VERSION"));

/// API token forwarded to the forge. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    /// Reads the token from the environment variable `var`.
    ///
    /// An unset or blank variable is a [`ReleaseError::MissingCredential`].
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(token) if !token.trim().is_empty() => Ok(Credential(token.trim().to_string())),
            _ => Err(ReleaseError::MissingCredential(var.to_string())),
        }
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Creates releases on a forge.
pub trait ReleasePublisher {
    /// Whether a release for `tag` already exists
    fn release_exists(&self, owner: &str, repository: &str, tag: &str) -> Result<bool>;

    /// Creates the release and returns its published URL
    fn create_release(&self, request: &ReleaseRequest) -> Result<String>;
}

/// GitHub (or GitHub Enterprise) REST API client.
pub struct GitHubPublisher {
    api_base: String,
    credential: Credential,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct CreatedRelease {
    html_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GitHubPublisher {
    pub fn new(api_base: impl Into<String>, credential: Credential) -> Self {
        GitHubPublisher {
            api_base: api_base.into(),
            credential,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// `<api base>/repos/<owner>/<repository>/releases[/<extra>...]`, with
    /// every segment percent-encoded.
    pub fn endpoint(&self, owner: &str, repository: &str, extra: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| ReleaseError::config(format!("invalid forge API URL '{}': {}", self.api_base, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ReleaseError::config(format!("invalid forge API URL '{}'", self.api_base)))?;
            segments
                .pop_if_empty()
                .extend(["repos", owner, repository, "releases"])
                .extend(extra);
        }
        Ok(url)
    }

    fn request(&self, method: &str, url: &Url) -> ureq::Request {
        self.agent
            .request(method, url.as_str())
            .set("Authorization", &format!("Bearer {}", self.credential.secret()))
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", USER_AGENT)
    }
}

/// Turns a failed API call into a [`ReleaseError::Forge`], preferring the
/// API's own error message.
fn forge_error(err: ureq::Error) -> ReleaseError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            ReleaseError::Forge {
                status,
                message: api_message(&body),
            }
        }
        other => ReleaseError::Forge {
            status: 0,
            message: other.to_string(),
        },
    }
}

fn api_message(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(error) => error.message,
        Err(_) => body.trim().to_string(),
    }
}

impl ReleasePublisher for GitHubPublisher {
    fn release_exists(&self, owner: &str, repository: &str, tag: &str) -> Result<bool> {
        let url = self.endpoint(owner, repository, &["tags", tag])?;
        tracing::debug!(url = %url, "checking for existing release");
        match self.request("GET", &url).call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::Status(404, _)) => Ok(false),
            Err(e) => Err(forge_error(e)),
        }
    }

    fn create_release(&self, request: &ReleaseRequest) -> Result<String> {
        let url = self.endpoint(&request.owner, &request.repository, &[])?;
        tracing::debug!(url = %url, tag = %request.tag, "creating release");

        let response = self
            .request("POST", &url)
            .send_json(serde_json::json!({
                "tag_name": request.tag,
                "name": request.title,
                "body": request.body,
                "prerelease": request.prerelease,
            }))
            .map_err(forge_error)?;

        let created: CreatedRelease = response.into_json()?;
        created
            .html_url
            .or(created.url)
            .ok_or_else(|| ReleaseError::Forge {
                status: 201,
                message: "release created but no URL returned".to_string(),
            })
    }
}
