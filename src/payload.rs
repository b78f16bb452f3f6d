//! Release request assembly from a package's changelog.

use std::fs;
use std::io::{self, ErrorKind};

use serde::Serialize;

use crate::changelog::{extract, ChangelogDocument};
use crate::error::{ReleaseError, Result};
use crate::remote::RepositoryIdentity;
use crate::workspace::Package;

/// Reads a package's changelog text.
///
/// A missing changelog must be reported as [`ErrorKind::NotFound`].
pub trait ChangelogSource {
    fn read_changelog(&self, package: &Package) -> io::Result<String>;
}

/// Reads `<package dir>/<file name>` from disk.
pub struct FsChangelogs {
    file_name: String,
}

impl FsChangelogs {
    pub fn new(file_name: impl Into<String>) -> Self {
        FsChangelogs {
            file_name: file_name.into(),
        }
    }
}

impl ChangelogSource for FsChangelogs {
    fn read_changelog(&self, package: &Package) -> io::Result<String> {
        fs::read_to_string(package.dir.join(&self.file_name))
    }
}

/// Everything the forge needs to create one release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRequest {
    pub title: String,
    pub tag: String,
    pub body: String,
    pub prerelease: bool,
    pub owner: String,
    pub repository: String,
}

/// Pre-release versions carry a hyphenated identifier (`2.0.0-beta.1`).
pub fn is_prerelease(version: &str) -> bool {
    version.contains('-')
}

/// Builds the release request for a tagged package.
///
/// Returns `Ok(None)` when the package has no changelog file, so the package
/// is left out of publishing. A changelog without a section for the
/// package's version is an error: the tag exists but its notes do not.
pub fn build_release_request(
    package: &Package,
    tag_name: &str,
    identity: &RepositoryIdentity,
    changelogs: &dyn ChangelogSource,
) -> Result<Option<ReleaseRequest>> {
    let text = match changelogs.read_changelog(package) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(package = %package.name, "no changelog, skipping release");
            return Ok(None);
        }
        Err(e) => return Err(ReleaseError::Io(e)),
    };

    let document = ChangelogDocument::parse(&text)?;
    let entry = extract(&document, &package.version);
    if !entry.section_found {
        return Err(ReleaseError::MissingChangelogEntry {
            package: package.name.clone(),
            version: package.version.clone(),
        });
    }

    Ok(Some(ReleaseRequest {
        title: tag_name.to_string(),
        tag: tag_name.to_string(),
        body: entry.content(),
        prerelease: is_prerelease(&package.version),
        owner: identity.owner.clone(),
        repository: identity.project.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::parse_remote_url;
    use std::collections::HashMap;

    struct MapChangelogs(HashMap<String, io::Result<String>>);

    impl ChangelogSource for MapChangelogs {
        fn read_changelog(&self, package: &Package) -> io::Result<String> {
            match self.0.get(&package.name) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(e)) => Err(io::Error::new(e.kind(), e.to_string())),
                None => Err(io::Error::new(ErrorKind::NotFound, "no changelog")),
            }
        }
    }

    fn identity() -> RepositoryIdentity {
        parse_remote_url("git@github.com:acme/widgets.git").unwrap()
    }

    fn changelogs(name: &str, text: io::Result<String>) -> MapChangelogs {
        let mut map = HashMap::new();
        map.insert(name.to_string(), text);
        MapChangelogs(map)
    }

    #[test]
    fn test_builds_request_from_matching_section() {
        let pkg = Package::new("pkg-b", "0.2.0", "packages/b");
        let source = changelogs(
            "pkg-b",
            Ok("# pkg-b\n\n## 0.2.0\n\n### Minor Changes\n\n- add api\n\n## 0.1.0\n\n- init\n".to_string()),
        );

        let request = build_release_request(&pkg, "pkg-b@0.2.0", &identity(), &source)
            .unwrap()
            .unwrap();

        assert_eq!(request.title, "pkg-b@0.2.0");
        assert_eq!(request.tag, "pkg-b@0.2.0");
        assert_eq!(request.body, "### Minor Changes\n\n- add api\n");
        assert!(!request.prerelease);
        assert_eq!(request.owner, "acme");
        assert_eq!(request.repository, "widgets");
    }

    #[test]
    fn test_missing_changelog_is_omitted() {
        let pkg = Package::new("pkg-b", "0.2.0", "packages/b");
        let source = MapChangelogs(HashMap::new());
        assert_eq!(
            build_release_request(&pkg, "pkg-b@0.2.0", &identity(), &source).unwrap(),
            None
        );
    }

    #[test]
    fn test_other_read_errors_propagate() {
        let pkg = Package::new("pkg-b", "0.2.0", "packages/b");
        let source = changelogs(
            "pkg-b",
            Err(io::Error::new(ErrorKind::PermissionDenied, "denied")),
        );
        let err = build_release_request(&pkg, "pkg-b@0.2.0", &identity(), &source).unwrap_err();
        assert!(matches!(err, ReleaseError::Io(_)));
    }

    #[test]
    fn test_changelog_without_version_section_is_fatal() {
        let pkg = Package::new("pkg-b", "0.3.0", "packages/b");
        let source = changelogs("pkg-b", Ok("# pkg-b\n\n## 0.2.0\n\n- old\n".to_string()));
        let err = build_release_request(&pkg, "pkg-b@0.3.0", &identity(), &source).unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::MissingChangelogEntry { ref package, ref version }
                if package == "pkg-b" && version == "0.3.0"
        ));
    }

    #[test]
    fn test_prerelease_flag() {
        assert!(is_prerelease("2.0.0-beta.1"));
        assert!(!is_prerelease("2.0.0"));

        let pkg = Package::new("solo", "2.0.0-beta.1", ".");
        let source = changelogs("solo", Ok("## 2.0.0-beta.1\n\n- preview\n".to_string()));
        let request = build_release_request(&pkg, "v2.0.0-beta.1", &identity(), &source)
            .unwrap()
            .unwrap();
        assert!(request.prerelease);
    }
}
