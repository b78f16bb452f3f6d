//! Development releases: tag the current commit of one package and push it.
//!
//! Tags look like `<name>@<version>-dev.<commit>` and are created at most
//! once per commit.

use semver::Version;

use crate::error::{ReleaseError, Result};
use crate::git::VersionControl;
use crate::remote::release_remote;
use crate::workspace::{Layout, Package, PackageRegistry};

/// How a dev release ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevReleaseOutcome {
    /// The tag already exists on the remote; nothing was done
    AlreadyReleased { tag: String },
    /// The tag was pushed; `created` is false when it already existed locally
    Pushed {
        tag: String,
        remote: String,
        created: bool,
    },
}

/// Picks the package to dev-release.
///
/// An explicit name wins, then the configured default, then the sole package
/// of a single-package workspace.
pub fn select_package(
    registry: &PackageRegistry,
    requested: Option<&str>,
    configured: Option<&str>,
) -> Result<Package> {
    if let Some(name) = requested.or(configured) {
        return registry
            .find(name)
            .cloned()
            .ok_or_else(|| ReleaseError::UnknownPackage(name.to_string()));
    }

    match (registry.layout, registry.packages.as_slice()) {
        (Layout::SinglePackage, [package]) => Ok(package.clone()),
        (_, []) => Err(ReleaseError::EmptyRegistry),
        _ => Err(ReleaseError::config(
            "multiple packages in workspace; pass --package or set dev_release.package",
        )),
    }
}

/// `<name>@<version>-dev.<commit>`, appended to the version as written, so
/// `2.0.0-beta.1` becomes `2.0.0-beta.1-dev.<commit>`.
///
/// The version must be valid semver.
pub fn dev_tag_name(package: &Package, commit: &str) -> Result<String> {
    Version::parse(&package.version).map_err(|e| {
        ReleaseError::version(format!("{}@{}: {}", package.name, package.version, e))
    })?;

    Ok(format!("{}@{}-dev.{}", package.name, package.version, commit))
}

/// Tags `HEAD` for `package` and pushes the tag to the release remote.
pub fn run_dev_release(
    vcs: &dyn VersionControl,
    package: &Package,
    tag_message: &str,
) -> Result<DevReleaseOutcome> {
    let commit = vcs.head_commit()?;
    let tag = dev_tag_name(package, &commit)?;
    let remote = release_remote(vcs)?;

    if vcs.remote_tag_exists(&remote, &tag)? {
        return Ok(DevReleaseOutcome::AlreadyReleased { tag });
    }

    let created = !vcs.local_tag_exists(&tag)?;
    if created {
        vcs.create_annotated_tag(&tag, tag_message)?;
    }
    vcs.push_tag(&remote, &tag)?;

    Ok(DevReleaseOutcome::Pushed {
        tag,
        remote,
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockVersionControl;

    const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

    fn package_a() -> Package {
        Package::new("package-a", "1.4.0", "packages/package-a")
    }

    #[test]
    fn test_dev_tag_name() {
        assert_eq!(
            dev_tag_name(&package_a(), SHA).unwrap(),
            format!("package-a@1.4.0-dev.{}", SHA)
        );

        let beta = Package::new("@scope/pkg", "2.0.0-beta.1", ".");
        assert_eq!(
            dev_tag_name(&beta, "abc123").unwrap(),
            "@scope/pkg@2.0.0-beta.1-dev.abc123"
        );
        assert!(Version::parse("2.0.0-beta.1-dev.abc123").is_ok());
    }

    #[test]
    fn test_invalid_version_is_rejected() {
        let pkg = Package::new("package-a", "latest", ".");
        assert!(matches!(
            dev_tag_name(&pkg, SHA),
            Err(ReleaseError::Version(_))
        ));
    }

    #[test]
    fn test_creates_and_pushes_new_tag() {
        let mut vcs = MockVersionControl::new();
        vcs.set_head(SHA);

        let outcome = run_dev_release(&vcs, &package_a(), "dev-release").unwrap();
        let tag = format!("package-a@1.4.0-dev.{}", SHA);
        assert_eq!(
            outcome,
            DevReleaseOutcome::Pushed {
                tag: tag.clone(),
                remote: "origin".to_string(),
                created: true,
            }
        );
        assert_eq!(
            vcs.calls(),
            vec![
                format!("create_annotated_tag {} dev-release", tag),
                format!("push_tag origin {}", tag),
            ]
        );
    }

    #[test]
    fn test_existing_remote_tag_short_circuits() {
        let mut vcs = MockVersionControl::new();
        vcs.set_head(SHA);
        vcs.add_remote_tag(&format!("package-a@1.4.0-dev.{}", SHA));

        let outcome = run_dev_release(&vcs, &package_a(), "dev-release").unwrap();
        assert!(matches!(outcome, DevReleaseOutcome::AlreadyReleased { .. }));
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn test_existing_local_tag_is_pushed_without_recreating() {
        let mut vcs = MockVersionControl::new();
        vcs.set_head(SHA);
        vcs.set_branch("main", Some("upstream"));
        let tag = format!("package-a@1.4.0-dev.{}", SHA);
        vcs.add_local_tag(&tag);

        let outcome = run_dev_release(&vcs, &package_a(), "dev-release").unwrap();
        assert_eq!(
            outcome,
            DevReleaseOutcome::Pushed {
                tag: tag.clone(),
                remote: "upstream".to_string(),
                created: false,
            }
        );
        assert_eq!(vcs.calls(), vec![format!("push_tag upstream {}", tag)]);
    }

    #[test]
    fn test_select_package() {
        let multi = PackageRegistry::new(
            vec![package_a(), Package::new("package-b", "0.1.0", "packages/b")],
            Layout::MultiPackage,
        );
        assert_eq!(
            select_package(&multi, Some("package-b"), Some("package-a"))
                .unwrap()
                .name,
            "package-b"
        );
        assert_eq!(
            select_package(&multi, None, Some("package-a")).unwrap().name,
            "package-a"
        );
        assert!(matches!(
            select_package(&multi, None, None),
            Err(ReleaseError::Config(_))
        ));
        assert!(matches!(
            select_package(&multi, Some("ghost"), None),
            Err(ReleaseError::UnknownPackage(_))
        ));

        let single = PackageRegistry::new(vec![package_a()], Layout::SinglePackage);
        assert_eq!(select_package(&single, None, None).unwrap().name, "package-a");

        let empty = PackageRegistry::new(Vec::new(), Layout::SinglePackage);
        assert!(matches!(
            select_package(&empty, None, None),
            Err(ReleaseError::EmptyRegistry)
        ));
    }
}
