//! Package discovery for changeset-managed workspaces.
//!
//! A workspace root either declares member globs (`workspaces` in
//! `package.json`, or `packages` in `pnpm-workspace.yaml`) or is itself the
//! only package.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ReleaseError, Result};

const MANIFEST: &str = "package.json";
const PNPM_WORKSPACE: &str = "pnpm-workspace.yaml";

/// One releasable package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub dir: PathBuf,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Package {
            name: name.into(),
            version: version.into(),
            dir: dir.into(),
        }
    }
}

/// How the workspace root relates to its packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The root manifest is the only package; tags are `v<version>`
    SinglePackage,
    /// Member packages matched by workspace globs; tags are `<name>@<version>`
    MultiPackage,
}

/// Snapshot of the workspace's packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRegistry {
    pub packages: Vec<Package>,
    pub layout: Layout,
}

impl PackageRegistry {
    pub fn new(packages: Vec<Package>, layout: Layout) -> Self {
        PackageRegistry { packages, layout }
    }

    /// Looks a package up by exact name
    pub fn find(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }
}

/// Source of the package registry.
pub trait WorkspaceSource {
    fn load(&self) -> Result<PackageRegistry>;
}

/// Reads packages from manifests on disk.
pub struct NodeWorkspace {
    root: PathBuf,
}

impl NodeWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        NodeWorkspace { root: root.into() }
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    name: Option<String>,
    version: Option<String>,
    workspaces: Option<Workspaces>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Workspaces {
    Globs(Vec<String>),
    Config {
        #[serde(default)]
        packages: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
struct PnpmWorkspace {
    #[serde(default)]
    packages: Vec<String>,
}

impl WorkspaceSource for NodeWorkspace {
    fn load(&self) -> Result<PackageRegistry> {
        let root_manifest = read_manifest(&self.root.join(MANIFEST))?;
        let patterns = workspace_patterns(&self.root, &root_manifest)?;

        if patterns.is_empty() {
            let packages = package_from(root_manifest, &self.root).into_iter().collect();
            return Ok(PackageRegistry::new(packages, Layout::SinglePackage));
        }

        let packages = discover_members(&self.root, &patterns)?;
        tracing::debug!(count = packages.len(), "discovered workspace packages");
        Ok(PackageRegistry::new(packages, Layout::MultiPackage))
    }
}

fn read_manifest(path: &Path) -> Result<Manifest> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ReleaseError::workspace(format!("no {} found", path.display())),
        _ => ReleaseError::Io(e),
    })?;
    serde_json::from_str(&text)
        .map_err(|e| ReleaseError::workspace(format!("{}: {}", path.display(), e)))
}

fn workspace_patterns(root: &Path, manifest: &Manifest) -> Result<Vec<String>> {
    let pnpm_path = root.join(PNPM_WORKSPACE);
    match fs::read_to_string(&pnpm_path) {
        Ok(text) => {
            let config: PnpmWorkspace = serde_yaml::from_str(&text)
                .map_err(|e| ReleaseError::workspace(format!("{}: {}", pnpm_path.display(), e)))?;
            return Ok(config.packages);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    Ok(match &manifest.workspaces {
        Some(Workspaces::Globs(globs)) => globs.clone(),
        Some(Workspaces::Config { packages }) => packages.clone(),
        None => Vec::new(),
    })
}

fn discover_members(root: &Path, patterns: &[String]) -> Result<Vec<Package>> {
    let (excluded, included): (Vec<&String>, Vec<&String>) =
        patterns.iter().partition(|p| p.starts_with('!'));

    let excluded = excluded
        .iter()
        .map(|p| glob::Pattern::new(p.trim_start_matches('!').trim_end_matches('/')))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ReleaseError::workspace(format!("invalid workspace pattern: {}", e)))?;

    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    let mut dirs = BTreeSet::new();
    for pattern in included {
        let manifest_glob = format!(
            "{}/{}/{}",
            escaped_root,
            pattern.trim_end_matches('/'),
            MANIFEST
        );
        let matches = glob::glob(&manifest_glob)
            .map_err(|e| ReleaseError::workspace(format!("invalid workspace pattern '{}': {}", pattern, e)))?;

        for entry in matches {
            let manifest_path =
                entry.map_err(|e| ReleaseError::workspace(e.to_string()))?;
            let Some(dir) = manifest_path.parent() else {
                continue;
            };
            let relative = dir.strip_prefix(root).unwrap_or(dir);
            if relative.components().any(|c| c.as_os_str() == "node_modules") {
                continue;
            }
            if excluded.iter().any(|p| p.matches_path(relative)) {
                continue;
            }
            dirs.insert(dir.to_path_buf());
        }
    }

    let mut packages = Vec::new();
    for dir in dirs {
        let manifest = read_manifest(&dir.join(MANIFEST))?;
        if let Some(package) = package_from(manifest, &dir) {
            packages.push(package);
        }
    }
    Ok(packages)
}

fn package_from(manifest: Manifest, dir: &Path) -> Option<Package> {
    let name = manifest.name?;
    let version = manifest.version.unwrap_or_else(|| "0.0.0".to_string());
    Some(Package::new(name, version, dir))
}
