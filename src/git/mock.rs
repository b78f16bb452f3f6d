use crate::error::{ReleaseError, Result};
use crate::git::VersionControl;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Mock version control for testing without actual git operations.
///
/// Mutating operations are recorded in [`MockVersionControl::calls`] and can
/// be made to fail with [`MockVersionControl::fail_on`].
pub struct MockVersionControl {
    dirty: bool,
    branch: Option<String>,
    branch_remotes: HashMap<String, String>,
    remotes: HashMap<String, String>,
    head: String,
    local_tags: RefCell<BTreeSet<String>>,
    remote_tags: RefCell<BTreeSet<String>>,
    failing: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl MockVersionControl {
    /// Create a clean mock repository on branch `main` with an `origin` remote
    pub fn new() -> Self {
        let mut remotes = HashMap::new();
        remotes.insert(
            "origin".to_string(),
            "git@github.com:acme/widgets.git".to_string(),
        );
        MockVersionControl {
            dirty: false,
            branch: Some("main".to_string()),
            branch_remotes: HashMap::new(),
            remotes,
            head: "0123456789abcdef0123456789abcdef01234567".to_string(),
            local_tags: RefCell::new(BTreeSet::new()),
            remote_tags: RefCell::new(BTreeSet::new()),
            failing: HashSet::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Mark the working tree as having uncommitted changes
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Check out `branch`, optionally tracking `remote`
    pub fn set_branch(&mut self, branch: &str, remote: Option<&str>) {
        self.branch = Some(branch.to_string());
        if let Some(remote) = remote {
            self.branch_remotes
                .insert(branch.to_string(), remote.to_string());
        }
    }

    /// Detach `HEAD`
    pub fn detach_head(&mut self) {
        self.branch = None;
    }

    /// Add or replace a remote
    pub fn add_remote(&mut self, name: &str, url: &str) {
        self.remotes.insert(name.to_string(), url.to_string());
    }

    /// Set the `HEAD` commit SHA
    pub fn set_head(&mut self, sha: &str) {
        self.head = sha.to_string();
    }

    /// Add a tag that exists only locally
    pub fn add_local_tag(&mut self, tag: &str) {
        self.local_tags.borrow_mut().insert(tag.to_string());
    }

    /// Add a tag that exists on the remote (and locally)
    pub fn add_remote_tag(&mut self, tag: &str) {
        self.local_tags.borrow_mut().insert(tag.to_string());
        self.remote_tags.borrow_mut().insert(tag.to_string());
    }

    /// Make the named operation (e.g. `"commit"`, `"push_follow_tags"`) fail
    pub fn fail_on(&mut self, operation: &str) {
        self.failing.insert(operation.to_string());
    }

    /// Mutating operations performed so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, operation: &str, detail: &str) -> Result<()> {
        let entry = if detail.is_empty() {
            operation.to_string()
        } else {
            format!("{} {}", operation, detail)
        };
        self.calls.borrow_mut().push(entry);
        if self.failing.contains(operation) {
            return Err(ReleaseError::tool(
                format!("git {}", operation),
                format!("mock failure in {}", operation),
            ));
        }
        Ok(())
    }
}

impl Default for MockVersionControl {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionControl for MockVersionControl {
    fn is_dirty(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn stage_all(&self) -> Result<()> {
        self.record("stage_all", "")
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record("commit", message)
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        self.record("create_annotated_tag", &format!("{} {}", name, message))?;
        self.local_tags.borrow_mut().insert(name.to_string());
        Ok(())
    }

    fn push_follow_tags(&self) -> Result<String> {
        self.record("push_follow_tags", "")?;
        let pushed: Vec<String> = self.local_tags.borrow().iter().cloned().collect();
        self.remote_tags.borrow_mut().extend(pushed);
        Ok("Everything up-to-date".to_string())
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        self.record("push_tag", &format!("{} {}", remote, tag))?;
        self.remote_tags.borrow_mut().insert(tag.to_string());
        Ok(())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn remote_for_branch(&self, branch: &str) -> Result<Option<String>> {
        Ok(self.branch_remotes.get(branch).cloned())
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        self.remotes
            .get(remote)
            .cloned()
            .ok_or_else(|| ReleaseError::remote_url(remote, "remote not found"))
    }

    fn head_commit(&self) -> Result<String> {
        Ok(self.head.clone())
    }

    fn local_tag_exists(&self, tag: &str) -> Result<bool> {
        Ok(self.local_tags.borrow().contains(tag))
    }

    fn remote_tag_exists(&self, _remote: &str, tag: &str) -> Result<bool> {
        Ok(self.remote_tags.borrow().contains(tag))
    }
}
