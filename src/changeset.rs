//! Delegation to the changeset tool that owns version bumps and changelogs.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::ChangesetConfig;
use crate::error::Result;
use crate::process::{self, CommandOutput};

/// Operations of the changeset tool used by the release workflow.
pub trait ChangesetTool {
    /// Number of pending changesets waiting to be released
    fn pending_changesets(&self) -> Result<usize>;

    /// Human-readable release plan
    fn status(&self) -> Result<CommandOutput>;

    /// Rewrites manifests and changelogs with the pending bumps
    fn apply_versions(&self) -> Result<CommandOutput>;

    /// Tags newly versioned packages; the output lists every new tag
    fn tag(&self) -> Result<CommandOutput>;
}

/// Runs the configured changeset commands from the workspace root.
pub struct CommandChangesets {
    root: PathBuf,
    config: ChangesetConfig,
}

impl CommandChangesets {
    pub fn new(root: impl Into<PathBuf>, config: ChangesetConfig) -> Self {
        CommandChangesets {
            root: root.into(),
            config,
        }
    }
}

impl ChangesetTool for CommandChangesets {
    fn pending_changesets(&self) -> Result<usize> {
        count_changesets(&self.root.join(&self.config.directory))
    }

    fn status(&self) -> Result<CommandOutput> {
        process::run(&self.config.status, &self.root)
    }

    fn apply_versions(&self) -> Result<CommandOutput> {
        process::run(&self.config.version, &self.root)
    }

    fn tag(&self) -> Result<CommandOutput> {
        process::run(&self.config.tag, &self.root)
    }
}

/// Counts changeset files: every `*.md` in `dir` except its README.
pub fn count_changesets(dir: &Path) -> Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut count = 0;
    for entry in entries {
        let path = entry?.path();
        let is_markdown = path.extension().is_some_and(|ext| ext == "md");
        let is_readme = path
            .file_name()
            .is_some_and(|name| name.eq_ignore_ascii_case("README.md"));
        if path.is_file() && is_markdown && !is_readme {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_count_changesets_skips_readme_and_config() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".changeset");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("README.md"), "# Changesets").unwrap();
        fs::write(dir.join("config.json"), "{}").unwrap();
        fs::write(dir.join("brave-lions-dance.md"), "---\n\"pkg\": minor\n---\n\nAdd").unwrap();
        fs::write(dir.join("quiet-owls-sing.md"), "---\n\"pkg\": patch\n---\n\nFix").unwrap();

        assert_eq!(count_changesets(&dir).unwrap(), 2);
    }

    #[test]
    fn test_missing_changeset_directory_counts_zero() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(count_changesets(&tmp.path().join(".changeset")).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_commands_run_from_workspace_root() {
        let tmp = TempDir::new().unwrap();
        let config = ChangesetConfig {
            tag: vec![
                "sh".to_string(),
                "-c".to_string(),
                "echo \"New tag: $(basename \"$(pwd)\")@1.0.0\"".to_string(),
            ],
            ..ChangesetConfig::default()
        };
        let tool = CommandChangesets::new(tmp.path(), config);

        let output = tool.tag().unwrap();
        assert!(output.succeeded);
        let dir_name = tmp.path().file_name().unwrap().to_string_lossy();
        assert_eq!(output.stdout.trim(), format!("New tag: {}@1.0.0", dir_name));
    }
}
