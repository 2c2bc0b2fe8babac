use crate::error::{ChangelogError, Result};
use crate::git::{CommitRef, History, TagRef};
use git2::{Oid, Repository as Git2Repo};
use std::path::Path;

/// Wrapper around git2::Repository implementing the [History] trait
pub struct Git2History {
    repo: Git2Repo,
}

impl Git2History {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2History { repo })
    }

    /// Create from an existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2History { repo }
    }

    /// The repository working directory, if not bare.
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn commit_ref(&self, commit: &git2::Commit<'_>) -> CommitRef {
        let author = commit.author();
        let time = commit.time();

        CommitRef {
            hash: commit.id().to_string(),
            author: author.name().unwrap_or("unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
            time: time.seconds(),
            tz_offset_minutes: time.offset_minutes(),
            summary: commit.summary().unwrap_or("").to_string(),
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
        }
    }
}

impl History for Git2History {
    fn resolve(&self, rev: &str) -> Result<CommitRef> {
        let object = self.repo.revparse_single(rev)?;
        let commit = object
            .peel(git2::ObjectType::Commit)?
            .into_commit()
            .map_err(|_| ChangelogError::parse(format!("'{}' is not a commit", rev)))?;

        Ok(self.commit_ref(&commit))
    }

    fn head(&self) -> Result<CommitRef> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(self.commit_ref(&commit))
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            // Unborn branch or detached HEAD: no branch name to report
            Err(_) => return Ok(None),
        };

        if !head.is_branch() {
            return Ok(None);
        }

        Ok(head.shorthand().map(|s| s.to_string()))
    }

    fn tags(&self) -> Result<Vec<TagRef>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let reference = match self.repo.find_reference(&format!("refs/tags/{}", name)) {
                Ok(r) => r,
                Err(_) => continue,
            };

            // Peel to any object so both lightweight and annotated tags
            // resolve to the tagged commit
            if let Ok(object) = reference.peel(git2::ObjectType::Any) {
                tags.push(TagRef {
                    name: name.to_string(),
                    target: object.id().to_string(),
                });
            }
        }

        Ok(tags)
    }

    fn walk<'a>(
        &'a self,
        start: &str,
    ) -> Result<Box<dyn Iterator<Item = Result<CommitRef>> + 'a>> {
        let oid = Oid::from_str(start)
            .map_err(|e| ChangelogError::parse(format!("invalid commit hash '{}': {}", start, e)))?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(oid)?;

        Ok(Box::new(revwalk.map(move |item| {
            let oid = item?;
            let commit = self.repo.find_commit(oid)?;
            Ok(self.commit_ref(&commit))
        })))
    }

    fn is_traversal_boundary(&self, commit: &CommitRef) -> Result<bool> {
        let first_parent = match commit.parents.first() {
            Some(hash) => hash,
            None => return Ok(true),
        };

        let oid = Oid::from_str(first_parent).map_err(|e| {
            ChangelogError::parse(format!("invalid parent hash '{}': {}", first_parent, e))
        })?;

        // A shallow clone records the parent hash in the commit object but
        // does not carry the parent object itself
        Ok(self.repo.find_commit(oid).is_err())
    }
}
