use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use changeset_release::changeset::CommandChangesets;
use changeset_release::config::{self, Config};
use changeset_release::dev_release::{run_dev_release, select_package, DevReleaseOutcome};
use changeset_release::forge::{Credential, GitHubPublisher};
use changeset_release::git::GitRepository;
use changeset_release::payload::FsChangelogs;
use changeset_release::remote::resolve_repository;
use changeset_release::ui::{self, AssumeYes, Prompter, TerminalPrompter};
use changeset_release::workflow::{Collaborators, ReleaseWorkflow, WorkflowSettings};
use changeset_release::workspace::{NodeWorkspace, WorkspaceSource};

#[derive(clap::Parser)]
#[command(
    name = "changeset-release",
    version,
    about = "Version, tag, push and publish releases for changeset-managed workspaces"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, global = true, help = "Run as if started in this directory")]
    cwd: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Answer yes at every confirmation gate")]
    yes: bool,

    #[arg(short, long, global = true, help = "Print diagnostic logs to stderr")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Version, commit, tag, push and publish pending changesets (default)
    Release,
    /// Tag the current commit as a development release of one package and push the tag
    DevRelease {
        #[arg(short, long, help = "Package to dev-release")]
        package: Option<String>,
    },
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(dir) = &args.cwd {
        if let Err(e) = std::env::set_current_dir(dir) {
            ui::display_error(&format!("Cannot enter {}: {}", dir.display(), e));
            std::process::exit(1);
        }
    }

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    let root = Path::new(".");
    let result = match args.command.unwrap_or(Commands::Release) {
        Commands::Release => release(&config, root, args.yes),
        Commands::DevRelease { package } => dev_release(&config, root, package.as_deref()),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("changeset_release=debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn release(config: &Config, root: &Path, assume_yes: bool) -> Result<i32> {
    let credential = Credential::from_env(&config.forge.token_env)?;

    let vcs = GitRepository::open(root).context("Git repository error")?;
    let identity =
        resolve_repository(&vcs).context("Could not determine the repository to release to")?;
    let publisher = GitHubPublisher::new(
        identity.api_base(config.forge.api_url.as_deref()),
        credential,
    );

    let changesets = CommandChangesets::new(root, config.changeset.clone());
    let workspace = NodeWorkspace::new(root);
    let changelogs = FsChangelogs::new(&config.release.changelog_file);
    let prompter: Box<dyn Prompter> = if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompter)
    };

    let deps = Collaborators {
        vcs: &vcs,
        changesets: &changesets,
        workspace: &workspace,
        changelogs: &changelogs,
        publisher: &publisher,
        prompter: prompter.as_ref(),
    };
    let settings = WorkflowSettings {
        gates: config.gates,
        commit_message: config.release.commit_message.clone(),
    };

    let outcome = ReleaseWorkflow::new(deps, settings, identity).run();
    outcome.report();
    Ok(outcome.exit_code())
}

fn dev_release(config: &Config, root: &Path, package: Option<&str>) -> Result<i32> {
    Credential::from_env(&config.forge.token_env)?;

    let vcs = GitRepository::open(root).context("Git repository error")?;
    let registry = NodeWorkspace::new(root).load()?;
    let package = select_package(&registry, package, config.dev_release.package.as_deref())?;

    match run_dev_release(&vcs, &package, &config.dev_release.tag_message)? {
        DevReleaseOutcome::AlreadyReleased { tag } => {
            ui::display_status(&format!(
                "A dev release has already been created for the latest commit with tag {}",
                tag
            ));
        }
        DevReleaseOutcome::Pushed {
            tag,
            remote,
            created,
        } => {
            if !created {
                ui::display_status(&format!("Tag {} already exists locally", tag));
            }
            ui::display_success(&format!(
                "Successfully created and pushed a dev-release tag: {} to {}",
                tag, remote
            ));
        }
    }
    Ok(0)
}
