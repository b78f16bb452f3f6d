//! Classification of the changeset tool's tag output.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ReleaseError, Result};
use crate::workspace::{Layout, Package, PackageRegistry};

const NEW_TAG_MARKER: &str = "New tag:";

static NEW_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"New tag:\s+(\S+)").expect("valid regex"));

/// A package that received a new tag in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedPackageRef {
    pub package: Package,
    pub tag_name: String,
}

/// Splits `name@version` on its last `@`, so scoped names keep their leading `@`.
///
/// Returns `None` when either side is empty or the name is not a package
/// name (`name` or `@scope/name`).
pub fn split_name_version(segment: &str) -> Option<(&str, &str)> {
    let (name, version) = segment.rsplit_once('@')?;
    if version.is_empty() || !is_package_name(name) {
        return None;
    }
    Some((name, version))
}

/// A bare name without `/`, or a scoped `@scope/name` with exactly one `/`.
fn is_package_name(name: &str) -> bool {
    match name.strip_prefix('@') {
        Some(scoped) => matches!(
            scoped.split_once('/'),
            Some((scope, rest)) if !scope.is_empty() && !rest.is_empty() && !rest.contains('/')
        ),
        None => !name.is_empty() && !name.contains('/'),
    }
}

/// Determines which packages were newly tagged from the tag command's output.
///
/// In a multi-package workspace each `New tag: <name>@<version>` line names a
/// package, which must exist in the registry. In a single-package workspace
/// the first bare `New tag:` line tags the sole package as `v<version>`.
pub fn classify_tagged_packages(
    output: &str,
    registry: &PackageRegistry,
) -> Result<Vec<TaggedPackageRef>> {
    match registry.layout {
        Layout::MultiPackage => classify_multi(output, registry),
        Layout::SinglePackage => classify_single(output, registry),
    }
}

fn classify_multi(output: &str, registry: &PackageRegistry) -> Result<Vec<TaggedPackageRef>> {
    let mut tagged = Vec::new();
    for line in output.lines() {
        let Some(caps) = NEW_TAG.captures(line) else {
            continue;
        };
        let Some((name, _)) = split_name_version(&caps[1]) else {
            tracing::debug!(line, "ignoring tag line without a package version");
            continue;
        };
        let package = registry
            .find(name)
            .ok_or_else(|| ReleaseError::UnknownPackage(name.to_string()))?;

        tagged.push(TaggedPackageRef {
            tag_name: format!("{}@{}", package.name, package.version),
            package: package.clone(),
        });
    }
    Ok(tagged)
}

fn classify_single(output: &str, registry: &PackageRegistry) -> Result<Vec<TaggedPackageRef>> {
    let package = registry.packages.first().ok_or(ReleaseError::EmptyRegistry)?;

    let tagged = output
        .lines()
        .find(|line| line.contains(NEW_TAG_MARKER))
        .map(|_| TaggedPackageRef {
            tag_name: format!("v{}", package.version),
            package: package.clone(),
        });

    Ok(tagged.into_iter().collect())
}
