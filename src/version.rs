//! Version resolution from tags, hints, and prior changelogs.
//!
//! The resolver tries an ordered list of strategies and takes the first
//! one producing a value; the result is then extended with a `git` local
//! suffix identifying the exact commit being built.

use chrono::{TimeZone, Utc};
use regex::Regex;

use crate::error::{ChangelogError, Result};
use crate::git::{CommitRef, History};
use crate::metadata::PackageMetadata;
use crate::tags::{TagIndex, UPSTREAM_PREFIX};

const FALLBACK_VERSION: &str = "0.0.0";

/// Map the tag-safe stand-in characters back to their version form:
/// `_` becomes `~` and `%` becomes `:`.
///
/// Single-pass only; the mapping is not its own inverse.
pub fn sanitize_tag_version(version: &str) -> String {
    version.replace('_', "~").replace('%', ":")
}

/// Lower-case a string and collapse every run of characters outside
/// `[a-z0-9_]` into a single `.`.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();

    match Regex::new("[^a-z0-9_]+") {
        Ok(re) => re.replace_all(&lowered, ".").into_owned(),
        Err(_) => lowered,
    }
}

/// Remove every occurrence of the configured tag prefixes from a tag name.
pub fn strip_tag_prefixes(tag: &str, prefixes: &[String]) -> String {
    prefixes
        .iter()
        .fold(tag.to_string(), |acc, prefix| acc.replace(prefix.as_str(), ""))
}

/// The version carried by a release tag: prefixes stripped, the path
/// segment after the final `/`, stand-in characters mapped back.
pub fn tag_version(tag: &str, prefixes: &[String]) -> String {
    let stripped = strip_tag_prefixes(tag, prefixes);
    let last = stripped.rsplit('/').next().unwrap_or(stripped.as_str());

    sanitize_tag_version(last)
}

/// Produces the package version for one target commit.
///
/// The starting version comes from an ordered fallback chain (explicit
/// tag, nearest tags for non-native packages, plain nearest-tag walk,
/// prior changelog, `0.0.0`); the assembled version is memoized so that
/// repeated calls on one resolver instance return an identical string
/// even if the backing files change mid-run.
pub struct VersionResolver<'a> {
    history: &'a dyn History,
    tags: &'a TagIndex,
    tag_prefixes: &'a [String],
    target: CommitRef,
    explicit_tag: Option<String>,
    native: bool,
    version_hint: Option<String>,
    prior_version: Option<String>,
    comment: String,
    resolved: Option<String>,
}

impl<'a> VersionResolver<'a> {
    /// Create a resolver for one target commit.
    ///
    /// `comment` is slugified before use as the version suffix comment.
    pub fn new(
        history: &'a dyn History,
        tags: &'a TagIndex,
        tag_prefixes: &'a [String],
        target: CommitRef,
        explicit_tag: Option<String>,
        metadata: &PackageMetadata,
        comment: &str,
    ) -> Self {
        VersionResolver {
            history,
            tags,
            tag_prefixes,
            target,
            explicit_tag,
            native: metadata.native,
            version_hint: metadata.version_hint.clone(),
            prior_version: metadata.prior_version.clone(),
            comment: slugify(comment),
            resolved: None,
        }
    }

    /// Resolve the package version.
    ///
    /// Version template:
    ///     `<starting_version>(+|~)git<timestamp>.<short_commit>.<comment>`
    ///
    /// Non-native packages whose starting version carries no Debian
    /// revision get a fresh `-1` revision and the `~git` separator, so the
    /// snapshot sorts before the next real upload of that upstream
    /// version.
    pub fn resolve(&mut self) -> Result<String> {
        if let Some(version) = &self.resolved {
            return Ok(version.clone());
        }

        let starting = self.starting_version();

        let suffix = format!(
            "{}.{}.{}",
            self.timestamp(),
            self.target.short_hash(),
            self.comment
        );

        let version = if !self.native && !starting.contains('-') {
            // Starting version came from an upstream tag with no Debian
            // revision yet
            format!("{}-1~git{}", starting, suffix)
        } else {
            format!("{}+git{}", starting, suffix)
        };

        if !self.native && !version.contains('-') {
            return Err(ChangelogError::config(
                "non-native package but no debian revision specified while tagging",
            ));
        }

        self.resolved = Some(version.clone());
        Ok(version)
    }

    /// The starting version, from the first strategy that yields a value.
    ///
    /// Strategies swallow their own lookup failures so the chain can
    /// continue.
    fn starting_version(&self) -> String {
        let strategies: Vec<Box<dyn Fn() -> Option<String> + '_>> = vec![
            Box::new(|| self.from_explicit_tag()),
            Box::new(|| self.from_non_native_tags()),
            Box::new(|| self.from_ancestry_walk()),
            Box::new(|| self.prior_version.clone()),
            Box::new(|| Some(FALLBACK_VERSION.to_string())),
        ];

        strategies
            .iter()
            .find_map(|strategy| strategy())
            .unwrap_or_else(|| FALLBACK_VERSION.to_string())
    }

    /// Strategy 1: the version specified directly by the supplied tag.
    fn from_explicit_tag(&self) -> Option<String> {
        let tag = self.explicit_tag.as_deref()?;

        Some(tag_version(tag, self.tag_prefixes))
    }

    /// Strategy 2: nearest tags for non-native packages, taking eventual
    /// epochs into account.
    ///
    /// Release-prefix and `upstream/` tags are collected in ancestry
    /// order, with the version hint appended as a final candidate. The
    /// first release tag wins, unless an `upstream/` tag sits closer to
    /// the target: then the upstream version replaces it, keeping the
    /// release tag's epoch if it has one.
    fn from_non_native_tags(&self) -> Option<String> {
        if self.native {
            return None;
        }

        let walker = self.history.walk(&self.target.hash).ok()?;

        let mut candidates: Vec<String> = Vec::new();
        for item in walker {
            let commit = item.ok()?;
            if let Some(name) = self.tags.get(&commit.hash) {
                candidates.push(name.to_string());
            }
        }
        if let Some(hint) = &self.version_hint {
            candidates.push(hint.clone());
        }

        let mut latest_upstream: Option<String> = None;

        for name in &candidates {
            if self.tag_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
                let version = tag_version(name, self.tag_prefixes);

                return Some(match latest_upstream {
                    None => version,
                    Some(upstream) => match version.split_once(':') {
                        // The release tag carries an epoch: keep it in
                        // front of the newer upstream version
                        Some((epoch, _)) => format!("{}:{}", epoch, upstream),
                        None => upstream,
                    },
                });
            } else if let Some(upstream) = name.strip_prefix(UPSTREAM_PREFIX) {
                if latest_upstream.is_none() {
                    // Nearest upstream tag; whether an epoch applies is
                    // only known once a release tag shows up further down
                    latest_upstream = Some(sanitize_tag_version(upstream));
                }
            }
        }

        // upstream/ present but no release tag below it
        latest_upstream
    }

    /// Strategy 3: nearest release-prefix tag by plain ancestry walk.
    fn from_ancestry_walk(&self) -> Option<String> {
        let walker = self.history.walk(&self.target.hash).ok()?;

        for item in walker {
            let commit = item.ok()?;

            if let Some(name) = self.tags.get(&commit.hash) {
                if self.tag_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
                    let stripped = strip_tag_prefixes(name, self.tag_prefixes);
                    let version = stripped.split('/').nth(1)?;

                    return Some(sanitize_tag_version(version));
                }
            }
        }

        None
    }

    /// The target commit's timestamp as a 14-digit UTC string.
    fn timestamp(&self) -> String {
        Utc.timestamp_opt(self.target.time, 0)
            .single()
            .map(|dt| dt.format("%Y%m%d%H%M%S").to_string())
            .unwrap_or_else(|| "19700101000000".to_string())
    }
}
