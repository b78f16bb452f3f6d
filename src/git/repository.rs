use crate::error::{ReleaseError, Result};
use crate::git::VersionControl;
use crate::process::{self, CommandOutput};
use git2::{ErrorCode, Repository, StatusOptions};
use std::path::{Path, PathBuf};

/// Git repository backed by git2, shelling out to `git` for operations that
/// must honour the user's hooks, signing and credential helpers.
pub struct GitRepository {
    repo: Repository,
    root: PathBuf,
}

impl GitRepository {
    /// Open or discover a git repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;
        let root = repo
            .workdir()
            .ok_or_else(|| ReleaseError::config("bare repositories are not supported"))?
            .to_path_buf();

        Ok(GitRepository { repo, root })
    }

    /// Working tree root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        let command = format!("git {}", args.join(" "));
        process::run_args("git", args, &self.root)?.into_result(&command)
    }
}

impl VersionControl for GitRepository {
    fn is_dirty(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }

    fn stage_all(&self) -> Result<()> {
        self.git(&["add", ".", "--all"])?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.git(&["commit", "-m", message])?;
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let signature = self.repo.signature()?;
        self.repo
            .tag(name, head.as_object(), &signature, message, false)?;
        Ok(())
    }

    fn push_follow_tags(&self) -> Result<String> {
        let output = self.git(&["push", "--follow-tags"])?;
        // git reports push progress on stderr
        Ok(format!("{}{}", output.stdout, output.stderr).trim_end().to_string())
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        self.git(&["push", remote, "tag", tag])?;
        Ok(())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(str::to_string))
    }

    fn remote_for_branch(&self, branch: &str) -> Result<Option<String>> {
        let config = self.repo.config()?;
        match config.get_string(&format!("branch.{}.remote", branch)) {
            Ok(remote) => Ok(Some(remote)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        let found = self.repo.find_remote(remote)?;
        found
            .url()
            .map(str::to_string)
            .ok_or_else(|| ReleaseError::remote_url(remote, "remote URL is not valid UTF-8"))
    }

    fn head_commit(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    fn local_tag_exists(&self, tag: &str) -> Result<bool> {
        match self.repo.find_reference(&format!("refs/tags/{}", tag)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn remote_tag_exists(&self, remote: &str, tag: &str) -> Result<bool> {
        let refname = format!("refs/tags/{}", tag);
        let output = self.git(&["ls-remote", remote, &refname])?;
        Ok(!output.stdout.trim().is_empty())
    }
}
