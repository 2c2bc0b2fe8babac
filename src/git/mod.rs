//! Git history abstraction layer
//!
//! This module provides a trait-based abstraction over the commit and tag
//! history that changelog generation needs, allowing for multiple
//! implementations including real Git repositories and mock
//! implementations for testing.
//!
//! The primary abstraction is the [History] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2History]: A real implementation using the `git2` crate
//! - [mock::MockHistory]: A mock implementation for testing
//!
//! Most code should depend on the [History] trait rather than concrete
//! implementations to enable easy testing and flexibility.

pub mod mock;
pub mod repository;

pub use mock::MockHistory;
pub use repository::Git2History;

use crate::error::Result;

/// A single commit as seen by the changelog generator.
///
/// Immutable snapshot of the fields needed for version resolution and
/// history segmentation. Timestamps are committer times in seconds since
/// the epoch, with the committer's own timezone offset in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRef {
    /// Full commit hash
    pub hash: String,
    /// Author name
    pub author: String,
    /// Author email
    pub email: String,
    /// Committer timestamp, seconds since the epoch (UTC)
    pub time: i64,
    /// Committer timezone offset in minutes east of UTC
    pub tz_offset_minutes: i32,
    /// First line of the commit message
    pub summary: String,
    /// Parent commit hashes, in parent order
    pub parents: Vec<String>,
}

impl CommitRef {
    /// The abbreviated (7 character) form of the commit hash.
    pub fn short_hash(&self) -> &str {
        if self.hash.len() > 7 {
            &self.hash[..7]
        } else {
            &self.hash
        }
    }
}

/// A tag and the commit it points at (peeled for annotated tags).
#[derive(Debug, Clone, PartialEq)]
pub struct TagRef {
    /// Tag name, without the `refs/tags/` prefix
    pub name: String,
    /// Hash of the commit the tag resolves to
    pub target: String,
}

/// Source of commit ancestry and tag information.
///
/// Implementations must yield commits in backward traversal order
/// (newest first) from a starting commit, expose the full tag list, and
/// answer whether a given commit is the last one that can be traversed,
/// either a true root commit or the truncation point of a shallow clone.
///
/// ## Implementations
///
/// - [Git2History](repository::Git2History): Real Git implementation using the `git2` crate
/// - [MockHistory](mock::MockHistory): Test implementation with in-memory history
pub trait History {
    /// Resolve a revision string (hash, ref name, `HEAD`) to a commit.
    fn resolve(&self, rev: &str) -> Result<CommitRef>;

    /// The commit at the current HEAD.
    fn head(&self) -> Result<CommitRef>;

    /// Name of the currently checked-out branch, if any.
    fn current_branch(&self) -> Result<Option<String>>;

    /// All tags in the repository with their peeled target commits.
    fn tags(&self) -> Result<Vec<TagRef>>;

    /// Walk the ancestry of `start`, newest first, `start` included.
    ///
    /// The returned cursor is live: it is consumed by iteration and not
    /// restartable.
    fn walk<'a>(&'a self, start: &str)
        -> Result<Box<dyn Iterator<Item = Result<CommitRef>> + 'a>>;

    /// Whether `commit` is the last commit that can be traversed.
    ///
    /// True for root commits (no parents) and for commits whose first
    /// parent cannot be loaded; the latter signals the truncation point
    /// of a shallow clone, which must stop traversal but is not an error.
    fn is_traversal_boundary(&self, commit: &CommitRef) -> Result<bool>;
}
