use std::collections::HashMap;

use crate::error::Result;
use crate::git::History;

/// Prefix marking upstream version tags (e.g. `upstream/1.2.3`).
pub const UPSTREAM_PREFIX: &str = "upstream/";

/// Mapping from commit hash to tag name, restricted to the tags relevant
/// for changelog generation: those starting with one of the configured
/// release prefixes, or with the `upstream/` marker prefix.
///
/// Built once per run and read-only afterward. A commit carrying more
/// than one qualifying tag keeps only the last one indexed.
#[derive(Debug, Clone)]
pub struct TagIndex {
    by_commit: HashMap<String, String>,
}

impl TagIndex {
    /// Build the index from the repository tag list.
    pub fn build(history: &dyn History, tag_prefixes: &[String]) -> Result<Self> {
        let mut by_commit = HashMap::new();

        for tag in history.tags()? {
            let qualifies = tag_prefixes.iter().any(|p| tag.name.starts_with(p))
                || tag.name.starts_with(UPSTREAM_PREFIX);

            if qualifies {
                by_commit.insert(tag.target, tag.name);
            }
        }

        Ok(TagIndex { by_commit })
    }

    /// The tag name recorded for a commit, if any.
    pub fn get(&self, hash: &str) -> Option<&str> {
        self.by_commit.get(hash).map(|s| s.as_str())
    }

    /// Iterate over all (commit hash, tag name) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_commit.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of indexed tags.
    pub fn len(&self) -> usize {
        self.by_commit.len()
    }

    /// Whether the index holds no tags.
    pub fn is_empty(&self) -> bool {
        self.by_commit.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockHistory;

    fn prefixes() -> Vec<String> {
        vec!["droidian/".to_string()]
    }

    #[test]
    fn test_build_filters_by_prefix() {
        let mut history = MockHistory::new();
        history.add_tag("droidian/bookworm/1.0.0-1", "a");
        history.add_tag("upstream/2.0.0", "b");
        history.add_tag("v1.0.0", "c");

        let index = TagIndex::build(&history, &prefixes()).unwrap();

        assert_eq!(index.get("a"), Some("droidian/bookworm/1.0.0-1"));
        assert_eq!(index.get("b"), Some("upstream/2.0.0"));
        assert_eq!(index.get("c"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_duplicate_tags_last_wins() {
        let mut history = MockHistory::new();
        history.add_tag("droidian/bookworm/1.0.0-1", "a");
        history.add_tag("droidian/bookworm/1.0.0-2", "a");

        let index = TagIndex::build(&history, &prefixes()).unwrap();

        assert_eq!(index.get("a"), Some("droidian/bookworm/1.0.0-2"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_empty_repository() {
        let history = MockHistory::new();
        let index = TagIndex::build(&history, &prefixes()).unwrap();
        assert!(index.is_empty());
    }
}
