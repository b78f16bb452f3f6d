use thiserror::Error;

/// Unified error type for changeset-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: set the {0} environment variable")]
    MissingCredential(String),

    #[error("You have outstanding changes in your working directory. Please commit or stash them first before proceeding.")]
    DirtyWorkingTree,

    #[error("No changesets found")]
    NoChangesets,

    #[error("Command `{command}` failed: {stderr}")]
    Tool { command: String, stderr: String },

    #[error("Invalid remote URL '{url}': {reason}")]
    RemoteUrl { url: String, reason: String },

    #[error("Package \"{0}\" not found in workspace")]
    UnknownPackage(String),

    #[error("No package found in workspace")]
    EmptyRegistry,

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Changelog error: {0}")]
    Changelog(String),

    #[error("Could not find changelog entry for {package}@{version}")]
    MissingChangelogEntry { package: String, version: String },

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Forge request failed ({status}): {message}")]
    Forge { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in changeset-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a workspace discovery error with context
    pub fn workspace(msg: impl Into<String>) -> Self {
        ReleaseError::Workspace(msg.into())
    }

    /// Create a changelog error with context
    pub fn changelog(msg: impl Into<String>) -> Self {
        ReleaseError::Changelog(msg.into())
    }

    /// Create a remote URL parse error
    pub fn remote_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        ReleaseError::RemoteUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a tool delegation error, keeping the tool's stderr verbatim
    pub fn tool(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        ReleaseError::Tool {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReleaseError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReleaseError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_tool_error_keeps_stderr_verbatim() {
        let stderr = "error: pathspec 'x' did not match\nhint: check spelling";
        let err = ReleaseError::tool("git commit", stderr);
        assert!(err.to_string().ends_with(stderr));
        assert!(err.to_string().contains("`git commit`"));
    }

    #[test]
    fn test_missing_changelog_entry_names_package() {
        let err = ReleaseError::MissingChangelogEntry {
            package: "@scope/pkg".to_string(),
            version: "1.2.0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Could not find changelog entry for @scope/pkg@1.2.0"
        );
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ReleaseError::config("x"), "Configuration error"),
            (ReleaseError::version("x"), "Version parsing error"),
            (ReleaseError::workspace("x"), "Workspace error"),
            (ReleaseError::changelog("x"), "Changelog error"),
            (ReleaseError::remote_url("x", "y"), "Invalid remote URL"),
            (
                ReleaseError::UnknownPackage("pkg".to_string()),
                "Package \"pkg\"",
            ),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
