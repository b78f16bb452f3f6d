//! The confirmation-gated release workflow.
//!
//! Stages run strictly in order:
//! `Preflight -> Versioning -> Committing -> Tagging -> Pushing -> Publishing -> Done`.
//! Committing, tagging, pushing and publishing each wait for a yes at their
//! gate. A no stops the run cleanly; a failed external action stops it with
//! [`Outcome::Failed`]. Nothing is retried.

use std::fmt;

use crate::changeset::ChangesetTool;
use crate::config::GatesConfig;
use crate::error::{ReleaseError, Result};
use crate::forge::ReleasePublisher;
use crate::git::VersionControl;
use crate::payload::{build_release_request, ChangelogSource};
use crate::remote::RepositoryIdentity;
use crate::tags::{classify_tagged_packages, TaggedPackageRef};
use crate::ui::{self, Prompter};
use crate::workspace::WorkspaceSource;

/// Position of the workflow in its linear pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preflight,
    Versioning,
    Committing,
    Tagging,
    Pushing,
    Publishing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Preflight => "preflight",
            Stage::Versioning => "versioning",
            Stage::Committing => "committing",
            Stage::Tagging => "tagging",
            Stage::Pushing => "pushing",
            Stage::Publishing => "publishing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Confirmation points before irreversible steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Commit,
    Tag,
    Push,
    Publish,
}

impl Gate {
    pub fn question(&self) -> &'static str {
        match self {
            Gate::Commit => "Commit?",
            Gate::Tag => "Create tags?",
            Gate::Push => "Push to git forge?",
            Gate::Publish => "Release to Github?",
        }
    }

    pub fn default_answer(&self, gates: &GatesConfig) -> bool {
        match self {
            Gate::Commit => gates.commit,
            Gate::Tag => gates.tag,
            Gate::Push => gates.push,
            Gate::Publish => gates.publish,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gate::Commit => "commit",
            Gate::Tag => "tag",
            Gate::Push => "push",
            Gate::Publish => "publish",
        };
        f.write_str(name)
    }
}

/// One published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub package: String,
    pub tag_name: String,
    pub url: String,
}

/// How a workflow run ended.
#[derive(Debug)]
pub enum Outcome {
    /// Every tagged package with a changelog was published
    Released(Vec<ReleaseRecord>),
    /// The tag step created no tags
    NothingToPublish,
    /// Uncommitted changes in the working tree
    AbortedDirty,
    /// No pending changesets
    AbortedNoChanges,
    /// The operator answered no at a gate
    Declined(Gate),
    Failed {
        stage: Stage,
        cause: ReleaseError,
        /// Package being published when the failure happened
        package: Option<String>,
        /// Releases published before the failure
        releases: Vec<ReleaseRecord>,
    },
}

impl Outcome {
    /// Process exit code for this outcome.
    ///
    /// Declining the publish gate exits with 1 because the run ends with tags
    /// pushed but no releases.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Released(_) | Outcome::NothingToPublish => 0,
            Outcome::Declined(Gate::Publish) => 1,
            Outcome::Declined(_) => 0,
            Outcome::AbortedDirty | Outcome::AbortedNoChanges | Outcome::Failed { .. } => 1,
        }
    }

    /// Print the end-of-run report.
    pub fn report(&self) {
        match self {
            Outcome::Released(records) => ui::display_release_summary(records),
            Outcome::NothingToPublish => ui::display_status("No new tags were created, nothing to publish."),
            Outcome::AbortedDirty => ui::display_error(&ReleaseError::DirtyWorkingTree.to_string()),
            Outcome::AbortedNoChanges => ui::display_error(&ReleaseError::NoChangesets.to_string()),
            Outcome::Declined(gate) => ui::display_status(&format!("Stopped at the {} step.", gate)),
            Outcome::Failed {
                stage,
                cause,
                package,
                releases,
            } => {
                ui::display_error(&format!("{} failed: {}", stage, cause));
                if let Some(package) = package {
                    ui::display_error(&format!(
                        "Something went wrong while releasing {}",
                        package
                    ));
                }
                ui::display_partial_releases(releases);
            }
        }
    }
}

/// External collaborators the workflow delegates to.
pub struct Collaborators<'a> {
    pub vcs: &'a dyn VersionControl,
    pub changesets: &'a dyn ChangesetTool,
    pub workspace: &'a dyn WorkspaceSource,
    pub changelogs: &'a dyn ChangelogSource,
    pub publisher: &'a dyn ReleasePublisher,
    pub prompter: &'a dyn Prompter,
}

/// Settings for one workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub gates: GatesConfig,
    pub commit_message: String,
}

/// State machine driving one release.
pub struct ReleaseWorkflow<'a> {
    deps: Collaborators<'a>,
    settings: WorkflowSettings,
    identity: RepositoryIdentity,
    stage: Stage,
    current_package: Option<String>,
    releases: Vec<ReleaseRecord>,
}

impl<'a> ReleaseWorkflow<'a> {
    pub fn new(
        deps: Collaborators<'a>,
        settings: WorkflowSettings,
        identity: RepositoryIdentity,
    ) -> Self {
        ReleaseWorkflow {
            deps,
            settings,
            identity,
            stage: Stage::Preflight,
            current_package: None,
            releases: Vec::new(),
        }
    }

    /// Runs the workflow to completion or to the first stop.
    pub fn run(mut self) -> Outcome {
        match self.drive() {
            Ok(outcome) => outcome,
            Err(cause) => Outcome::Failed {
                stage: self.stage,
                cause,
                package: self.current_package.take(),
                releases: std::mem::take(&mut self.releases),
            },
        }
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!(from = %self.stage, to = %stage, "workflow transition");
        self.stage = stage;
    }

    fn gate(&self, gate: Gate) -> Result<bool> {
        let default = gate.default_answer(&self.settings.gates);
        let answer = self.deps.prompter.confirm(gate.question(), default)?;
        tracing::debug!(gate = %gate, answer, "gate answered");
        Ok(answer)
    }

    fn drive(&mut self) -> Result<Outcome> {
        if self.deps.vcs.is_dirty()? {
            return Ok(Outcome::AbortedDirty);
        }

        ui::display_status("Preparing to version packages...");
        if self.deps.changesets.pending_changesets()? == 0 {
            return Ok(Outcome::AbortedNoChanges);
        }

        self.enter(Stage::Versioning);
        let status = self.deps.changesets.status()?.into_result("changeset status")?;
        ui::display_tool_output(&status.stdout);
        self.deps
            .changesets
            .apply_versions()?
            .into_result("changeset version")?;

        self.enter(Stage::Committing);
        if !self.gate(Gate::Commit)? {
            return Ok(Outcome::Declined(Gate::Commit));
        }
        self.deps.vcs.stage_all()?;
        self.deps.vcs.commit(&self.settings.commit_message)?;
        ui::display_success(&format!("Committed \"{}\"", self.settings.commit_message));

        self.enter(Stage::Tagging);
        if !self.gate(Gate::Tag)? {
            return Ok(Outcome::Declined(Gate::Tag));
        }
        let tag_output = self.deps.changesets.tag()?.into_result("changeset tag")?;
        ui::display_tool_output(&tag_output.stdout);

        self.enter(Stage::Pushing);
        if !self.gate(Gate::Push)? {
            return Ok(Outcome::Declined(Gate::Push));
        }
        let pushed = self.deps.vcs.push_follow_tags()?;
        ui::display_tool_output(&pushed);

        self.enter(Stage::Publishing);
        if !self.gate(Gate::Publish)? {
            return Ok(Outcome::Declined(Gate::Publish));
        }
        let registry = self.deps.workspace.load()?;
        let tagged = classify_tagged_packages(&tag_output.stdout, &registry)?;
        if tagged.is_empty() {
            return Ok(Outcome::NothingToPublish);
        }

        for tagged_ref in &tagged {
            self.current_package = Some(tagged_ref.package.name.clone());
            self.publish(tagged_ref)?;
        }
        self.current_package = None;

        self.enter(Stage::Done);
        Ok(Outcome::Released(std::mem::take(&mut self.releases)))
    }

    fn publish(&mut self, tagged: &TaggedPackageRef) -> Result<()> {
        let package = &tagged.package;
        let Some(request) = build_release_request(
            package,
            &tagged.tag_name,
            &self.identity,
            self.deps.changelogs,
        )?
        else {
            ui::display_status(&format!("No changelog for {}, skipping release", package.name));
            return Ok(());
        };

        if self
            .deps
            .publisher
            .release_exists(&request.owner, &request.repository, &request.tag)?
        {
            ui::display_warning(&format!(
                "A release for {} already exists, skipping",
                request.tag
            ));
            return Ok(());
        }

        let url = self.deps.publisher.create_release(&request)?;
        ui::display_success(&format!("Released {}", request.tag));
        self.releases.push(ReleaseRecord {
            package: package.name.clone(),
            tag_name: tagged.tag_name.clone(),
            url,
        });
        Ok(())
    }
}
