use crate::error::{ChangelogError, Result};
use crate::git::{CommitRef, History, TagRef};
use std::collections::HashMap;

/// Mock history for testing without actual git operations.
///
/// Ancestry is walked along first-parent links. A commit whose first
/// parent is missing from the store behaves like the truncation point of
/// a shallow clone.
pub struct MockHistory {
    commits: HashMap<String, CommitRef>,
    tags: Vec<TagRef>,
    head: Option<String>,
    branch: Option<String>,
}

impl MockHistory {
    /// Create a new empty mock history
    pub fn new() -> Self {
        MockHistory {
            commits: HashMap::new(),
            tags: Vec::new(),
            head: None,
            branch: None,
        }
    }

    /// Add a commit to the mock history
    pub fn add_commit(&mut self, commit: CommitRef) {
        self.commits.insert(commit.hash.clone(), commit);
    }

    /// Add a tag pointing at a commit hash
    pub fn add_tag(&mut self, name: impl Into<String>, target: impl Into<String>) {
        self.tags.push(TagRef {
            name: name.into(),
            target: target.into(),
        });
    }

    /// Set the HEAD commit hash
    pub fn set_head(&mut self, hash: impl Into<String>) {
        self.head = Some(hash.into());
    }

    /// Set the checked-out branch name
    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.branch = Some(branch.into());
    }
}

impl Default for MockHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl History for MockHistory {
    fn resolve(&self, rev: &str) -> Result<CommitRef> {
        if rev == "HEAD" {
            return self.head();
        }

        self.commits
            .get(rev)
            .cloned()
            .ok_or_else(|| ChangelogError::not_found(format!("commit {}", rev)))
    }

    fn head(&self) -> Result<CommitRef> {
        let hash = self
            .head
            .as_ref()
            .ok_or_else(|| ChangelogError::not_found("HEAD".to_string()))?;

        self.resolve(hash)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn tags(&self) -> Result<Vec<TagRef>> {
        Ok(self.tags.clone())
    }

    fn walk<'a>(
        &'a self,
        start: &str,
    ) -> Result<Box<dyn Iterator<Item = Result<CommitRef>> + 'a>> {
        let first = self.resolve(start)?;

        Ok(Box::new(Walk {
            history: self,
            next: Some(first),
        }))
    }

    fn is_traversal_boundary(&self, commit: &CommitRef) -> Result<bool> {
        let first_parent = match commit.parents.first() {
            Some(hash) => hash,
            None => return Ok(true),
        };

        Ok(!self.commits.contains_key(first_parent))
    }
}

struct Walk<'a> {
    history: &'a MockHistory,
    next: Option<CommitRef>,
}

impl Iterator for Walk<'_> {
    type Item = Result<CommitRef>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;

        self.next = current
            .parents
            .first()
            .and_then(|hash| self.history.commits.get(hash))
            .cloned();

        Some(Ok(current))
    }
}
