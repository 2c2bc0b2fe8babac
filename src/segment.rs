//! History segmentation: partitioning commit ancestry into per-version
//! changelog entries.
//!
//! Traversal runs newest-first from the target commit. A commit carrying
//! a release tag closes the segment above it and opens the segment for
//! the release it tags; the last traversable commit (root, or the
//! truncation point of a shallow clone) closes whatever is pending.

use std::collections::HashMap;

use crate::error::{ChangelogError, Result};
use crate::git::{CommitRef, History};
use crate::tags::TagIndex;
use crate::version::{sanitize_tag_version, strip_tag_prefixes};

/// One changelog entry under construction: the contributing authors and
/// their commit messages, plus the identity and date of the newest commit
/// in the segment (used for the stanza trailer).
#[derive(Debug, Clone, PartialEq)]
pub struct ChangelogEntry {
    /// Author of the newest commit in the segment
    pub author: String,
    /// Email of the newest commit's author
    pub email: String,
    /// Committer timestamp of the newest commit
    pub time: i64,
    /// Committer timezone offset of the newest commit, minutes east of UTC
    pub tz_offset_minutes: i32,
    contents: Vec<(String, Vec<String>)>,
}

impl ChangelogEntry {
    fn from_commit(commit: &CommitRef) -> Self {
        ChangelogEntry {
            author: commit.author.clone(),
            email: commit.email.clone(),
            time: commit.time,
            tz_offset_minutes: commit.tz_offset_minutes,
            contents: Vec::new(),
        }
    }

    /// Record a commit's subject line under its author.
    ///
    /// Traversal is newest-first but display is oldest-first, so the
    /// message goes to the front of the author's list. Author buckets
    /// keep their first-seen order.
    fn record(&mut self, commit: &CommitRef) {
        match self
            .contents
            .iter_mut()
            .find(|(author, _)| author == &commit.author)
        {
            Some((_, messages)) => messages.insert(0, commit.summary.clone()),
            None => self
                .contents
                .push((commit.author.clone(), vec![commit.summary.clone()])),
        }
    }

    /// Number of distinct contributing authors.
    pub fn author_count(&self) -> usize {
        self.contents.len()
    }

    /// Iterate over `(author, messages)` pairs in first-seen order,
    /// messages oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.contents
            .iter()
            .map(|(author, messages)| (author.as_str(), messages.as_slice()))
    }
}

/// One closed segment: the release, the version, and the aggregated entry.
pub type Segment = (String, String, ChangelogEntry);

/// Lazy iterator over history segments, newest first.
///
/// Consumes a live traversal cursor; it is finite and not restartable.
pub struct Segments<'a> {
    history: &'a dyn History,
    walker: Box<dyn Iterator<Item = Result<CommitRef>> + 'a>,
    /// hash → prefix-stripped `release/version` tag text
    release_tags: HashMap<String, String>,
    target: String,
    nearest: (String, String),
    entry: Option<ChangelogEntry>,
    pending_err: Option<ChangelogError>,
    done: bool,
}

impl<'a> Segments<'a> {
    /// Start segmenting backward from `target`.
    ///
    /// `release` and `version` form the pair reported for the topmost
    /// segment: the resolver-computed values, not a tag literal.
    pub fn new(
        history: &'a dyn History,
        tags: &TagIndex,
        tag_prefixes: &[String],
        target: &CommitRef,
        release: String,
        version: String,
    ) -> Result<Self> {
        let release_tags = tags
            .iter()
            .filter(|(_, name)| tag_prefixes.iter().any(|p| name.starts_with(p.as_str())))
            .map(|(hash, name)| (hash.to_string(), strip_tag_prefixes(name, tag_prefixes)))
            .collect();

        let walker = history.walk(&target.hash)?;

        Ok(Segments {
            history,
            walker,
            release_tags,
            target: target.hash.clone(),
            nearest: (release, version),
            entry: None,
            pending_err: None,
            done: false,
        })
    }

    fn fail(&mut self, err: ChangelogError) -> Option<Result<Segment>> {
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for Segments<'_> {
    type Item = Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(err) = self.pending_err.take() {
            self.done = true;
            return Some(Err(err));
        }

        loop {
            let commit = match self.walker.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => return self.fail(e),
                Some(Ok(commit)) => commit,
            };

            let last = match self.history.is_traversal_boundary(&commit) {
                Ok(last) => last,
                Err(e) => return self.fail(e),
            };

            // The target commit itself never closes a segment, even when
            // tagged: its tag is what the version was resolved from
            let tag = if commit.hash != self.target {
                self.release_tags.get(&commit.hash).cloned()
            } else {
                None
            };

            if tag.is_none() && !last {
                self.entry
                    .get_or_insert_with(|| ChangelogEntry::from_commit(&commit))
                    .record(&commit);
                continue;
            }

            // This commit closes the pending segment
            let (release, version) = self.nearest.clone();

            if last {
                self.entry
                    .get_or_insert_with(|| ChangelogEntry::from_commit(&commit))
                    .record(&commit);
            }

            let finished = match self.entry.take() {
                Some(entry) => entry,
                None => ChangelogEntry::from_commit(&commit),
            };

            if last {
                self.done = true;
            } else if let Some(tag) = tag {
                match split_release_version(&tag) {
                    Ok(pair) => {
                        self.nearest = pair;

                        // The tagged commit is the release commit of the
                        // version it tags: it opens, and belongs to, the
                        // older segment
                        let mut opening = ChangelogEntry::from_commit(&commit);
                        opening.record(&commit);
                        self.entry = Some(opening);
                    }
                    // The finished segment is still valid; report the
                    // malformed tag on the next pull
                    Err(e) => self.pending_err = Some(e),
                }
            }

            return Some(Ok((release, version, finished)));
        }
    }
}

/// Build an entry directly from commits in traversal (newest-first)
/// order, bypassing segmentation. Test support only.
#[cfg(test)]
pub(crate) fn entry_for_tests(commits_newest_first: &[CommitRef]) -> ChangelogEntry {
    let mut entry = ChangelogEntry::from_commit(&commits_newest_first[0]);
    for commit in commits_newest_first {
        entry.record(commit);
    }
    entry
}

/// Split prefix-stripped tag text into its release and version halves,
/// mapping stand-in characters back in the version.
fn split_release_version(stripped_tag: &str) -> Result<(String, String)> {
    match stripped_tag.split_once('/') {
        Some((release, version)) => {
            Ok((release.to_string(), sanitize_tag_version(version)))
        }
        None => Err(ChangelogError::parse(format!(
            "tag '{}' does not carry a release/version pair",
            stripped_tag
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, author: &str, summary: &str) -> CommitRef {
        CommitRef {
            hash: hash.to_string(),
            author: author.to_string(),
            email: format!("{}@example.com", author.to_lowercase()),
            time: 1_600_000_000,
            tz_offset_minutes: 120,
            summary: summary.to_string(),
            parents: Vec::new(),
        }
    }

    #[test]
    fn test_entry_author_grouping() {
        // Traversal order is newest first: msg3 (Alice), msg2 (Bob),
        // msg1 (Alice)
        let newest = commit("c3", "Alice", "msg3");
        let mut entry = ChangelogEntry::from_commit(&newest);
        entry.record(&newest);
        entry.record(&commit("c2", "Bob", "msg2"));
        entry.record(&commit("c1", "Alice", "msg1"));

        let grouped: Vec<(&str, Vec<String>)> = entry
            .iter()
            .map(|(author, messages)| (author, messages.to_vec()))
            .collect();

        assert_eq!(
            grouped,
            vec![
                ("Alice", vec!["msg1".to_string(), "msg3".to_string()]),
                ("Bob", vec!["msg2".to_string()]),
            ]
        );
        assert_eq!(entry.author_count(), 2);
    }

    #[test]
    fn test_entry_identity_from_newest_commit() {
        let newest = commit("c2", "Alice", "newest");
        let mut entry = ChangelogEntry::from_commit(&newest);
        entry.record(&newest);
        entry.record(&commit("c1", "Bob", "older"));

        assert_eq!(entry.author, "Alice");
        assert_eq!(entry.email, "alice@example.com");
    }

    #[test]
    fn test_split_release_version() {
        assert_eq!(
            split_release_version("bookworm/1.2.3-2").unwrap(),
            ("bookworm".to_string(), "1.2.3-2".to_string())
        );
        // The version half is desanitized
        assert_eq!(
            split_release_version("bookworm/1%2.0_rc1-1").unwrap(),
            ("bookworm".to_string(), "1:2.0~rc1-1".to_string())
        );
        assert!(split_release_version("noversion").is_err());
    }
}
