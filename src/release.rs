//! Target release (suite) resolution.

use crate::config::Config;
use crate::error::{ChangelogError, Result};
use crate::version::strip_tag_prefixes;

/// Determine the target release name.
///
/// An explicit tag wins: its first path segment after prefix stripping is
/// the release. Otherwise the branch name is used, with the feature
/// prefix removed. At least one of the two must be present.
///
/// When the resolved name equals the configured rolling release and a
/// replacement suite is configured, the replacement is substituted.
pub fn resolve_release(
    explicit_tag: Option<&str>,
    branch: Option<&str>,
    config: &Config,
) -> Result<String> {
    let resolved = if let Some(tag) = explicit_tag {
        let stripped = strip_tag_prefixes(tag, &config.tag_prefixes);
        stripped
            .split('/')
            .next()
            .unwrap_or(stripped.as_str())
            .to_string()
    } else if let Some(branch) = branch {
        let stripped = branch.replace(config.branch_prefix.as_str(), "");
        stripped
            .split('/')
            .next()
            .unwrap_or(stripped.as_str())
            .to_string()
    } else {
        return Err(ChangelogError::config(
            "at least one of tag and branch must be specified",
        ));
    };

    match (&config.rolling_release, &config.rolling_release_replacement) {
        (Some(rolling), Some(replacement)) if &resolved == rolling => {
            Ok(replacement.clone())
        }
        _ => Ok(resolved),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn test_release_from_tag() {
        let release =
            resolve_release(Some("droidian/bookworm/1.2.3-2"), None, &config()).unwrap();
        assert_eq!(release, "bookworm");
    }

    #[test]
    fn test_tag_wins_over_branch() {
        let release = resolve_release(
            Some("droidian/bookworm/1.2.3-2"),
            Some("feature/bullseye/fix"),
            &config(),
        )
        .unwrap();
        assert_eq!(release, "bookworm");
    }

    #[test]
    fn test_release_from_branch() {
        let release =
            resolve_release(None, Some("feature/bookworm/my-fix"), &config()).unwrap();
        assert_eq!(release, "bookworm");
    }

    #[test]
    fn test_release_requires_tag_or_branch() {
        assert!(matches!(
            resolve_release(None, None, &config()),
            Err(ChangelogError::Config(_))
        ));
    }

    #[test]
    fn test_rolling_release_substitution() {
        let release = resolve_release(None, Some("droidian"), &config()).unwrap();
        assert_eq!(release, "trixie");
    }

    #[test]
    fn test_rolling_release_not_substituted_without_replacement() {
        let mut cfg = config();
        cfg.rolling_release_replacement = None;

        let release = resolve_release(None, Some("droidian"), &cfg).unwrap();
        assert_eq!(release, "droidian");
    }
}
