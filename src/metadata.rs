//! Packaging metadata read from the repository working tree.
//!
//! These are plain file reads feeding the version resolver: the source
//! package name, the native/non-native marker, an optional version hint,
//! and the starting version recorded in an already-existing changelog.

use std::fs;
use std::path::Path;

use crate::error::{ChangelogError, Result};

/// Inputs to version resolution gathered from the packaging files.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageMetadata {
    /// Source package name from `debian/control`
    pub name: String,
    /// Whether the package is native (no upstream/revision split)
    pub native: bool,
    /// Optional version hint file contents
    pub version_hint: Option<String>,
    /// Version recorded in the first line of a pre-existing changelog
    pub prior_version: Option<String>,
}

impl PackageMetadata {
    /// Gather all metadata from a repository working directory.
    ///
    /// The package name and the native marker are required; the hint and
    /// the prior version are optional.
    pub fn load(workdir: &Path, version_hint_file: &str, changelog_path: &str) -> Result<Self> {
        Ok(PackageMetadata {
            name: source_name(workdir)?,
            native: is_native(workdir)?,
            version_hint: read_version_hint(&workdir.join(version_hint_file)),
            prior_version: read_prior_version(&workdir.join(changelog_path)),
        })
    }
}

/// The source package name, from the `Source:` field of `debian/control`.
pub fn source_name(workdir: &Path) -> Result<String> {
    let control = workdir.join("debian/control");
    if !control.exists() {
        return Err(ChangelogError::not_found("debian/control"));
    }

    for line in fs::read_to_string(&control)?.lines() {
        if let Some(rest) = line.strip_prefix("Source:") {
            let name = rest.trim();
            if !name.is_empty() {
                return Ok(name.to_string());
            }
        }
    }

    Err(ChangelogError::not_found(
        "source package name in debian/control",
    ))
}

/// Whether the package is native, from `debian/source/format`.
///
/// Anything other than `3.0 (quilt)` counts as native.
pub fn is_native(workdir: &Path) -> Result<bool> {
    let format_path = workdir.join("debian/source/format");
    if !format_path.exists() {
        return Err(ChangelogError::not_found("debian/source/format"));
    }

    let format = fs::read_to_string(&format_path)?;
    Ok(format.trim() != "3.0 (quilt)")
}

/// Contents of the version hint file, if present and non-empty.
pub fn read_version_hint(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let trimmed = contents.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The version recorded in an existing changelog, if one can be read.
pub fn read_prior_version(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    parse_prior_version(contents.lines().next()?)
}

/// Extract the version token from a changelog first line.
///
/// The line has the shape `<name> (<version>) <release>; urgency=...`;
/// the token between the first parenthesis pair is the version. Malformed
/// lines yield `None` so the resolver can fall through to the next
/// strategy.
pub fn parse_prior_version(first_line: &str) -> Option<String> {
    let open = first_line.find('(')?;
    let rest = &first_line[open + 1..];
    let close = rest.find(')')?;
    let version = &rest[..close];

    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_prior_version() {
        assert_eq!(
            parse_prior_version("mypackage (1.2.3-1) bookworm; urgency=medium"),
            Some("1.2.3-1".to_string())
        );
    }

    #[test]
    fn test_parse_prior_version_malformed() {
        assert_eq!(parse_prior_version("not a changelog line"), None);
        assert_eq!(parse_prior_version("mypackage () bookworm"), None);
        assert_eq!(parse_prior_version("mypackage (1.2.3"), None);
        assert_eq!(parse_prior_version(""), None);
    }

    #[test]
    fn test_source_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("debian")).unwrap();
        fs::write(
            dir.path().join("debian/control"),
            "Source: mypackage\nSection: utils\n",
        )
        .unwrap();

        assert_eq!(source_name(dir.path()).unwrap(), "mypackage");
    }

    #[test]
    fn test_source_name_missing_control() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            source_name(dir.path()),
            Err(ChangelogError::NotFound(_))
        ));
    }

    #[test]
    fn test_source_name_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("debian")).unwrap();
        fs::write(dir.path().join("debian/control"), "Section: utils\n").unwrap();

        assert!(matches!(
            source_name(dir.path()),
            Err(ChangelogError::NotFound(_))
        ));
    }

    #[test]
    fn test_is_native() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("debian/source")).unwrap();

        fs::write(dir.path().join("debian/source/format"), "3.0 (quilt)\n").unwrap();
        assert!(!is_native(dir.path()).unwrap());

        fs::write(dir.path().join("debian/source/format"), "3.0 (native)\n").unwrap();
        assert!(is_native(dir.path()).unwrap());
    }

    #[test]
    fn test_is_native_missing_format() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            is_native(dir.path()),
            Err(ChangelogError::NotFound(_))
        ));
    }

    #[test]
    fn test_read_version_hint() {
        let dir = tempfile::tempdir().unwrap();
        let hint = dir.path().join("version-hint");

        assert_eq!(read_version_hint(&hint), None);

        fs::write(&hint, "droidian/bookworm/2.0.0-1\n").unwrap();
        assert_eq!(
            read_version_hint(&hint),
            Some("droidian/bookworm/2.0.0-1".to_string())
        );

        fs::write(&hint, "   \n").unwrap();
        assert_eq!(read_version_hint(&hint), None);
    }
}
