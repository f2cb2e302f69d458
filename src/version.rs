//! # Version Selection
//!
//! Parses raw git tag names into totally ordered [`VersionTag`] values and
//! picks the tag to materialize.
//!
//! ## Ordering
//!
//! A tag is read as an optional `v`/`V` prefix, a dotted numeric core and an
//! optional suffix:
//!
//! ```text
//! v1.10.0-beta.2
//! ^ ^^^^^^ ^^^^^^
//! | core   suffix
//! prefix
//! ```
//!
//! - Core segments are compared left to right as integers, the shorter core
//!   padded with zeros (`1.2` == `1.2.0`, `1.10.0` > `1.2.0`).
//! - When the cores are equal, a tag without a suffix is greater than one with
//!   a suffix (`1.0.0` > `1.0.0-rc.1`), and two suffixes compare segment by
//!   segment: numeric segments numerically, anything else as strings, numeric
//!   before non-numeric.
//!
//! Two distinct raw strings can therefore be equal as versions (`1.0` and
//! `v1.0.0`). If that happens at the top of the ordering the latest tag is
//! ambiguous and [`select_latest`] reports [`Error::AmbiguousVersion`].

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::error::{Error, Result};

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[vV]?(?P<core>[0-9]+(?:\.[0-9]+)*)(?:[-.+_~]?(?P<suffix>.*))$")
        .expect("version pattern is valid")
});

/// One segment of a version suffix.
///
/// Variant order matters: numeric segments sort before textual ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Number(u64),
    Text(String),
}

/// A raw tag name together with its parsed, comparable version.
///
/// Equality and ordering consider only the parsed version, never the raw
/// string. Displaying a `VersionTag` prints the raw tag, which is also what
/// git commands and the marker file use.
#[derive(Debug, Clone)]
pub struct VersionTag {
    raw: String,
    core: Vec<u64>,
    suffix: Vec<Segment>,
}

impl VersionTag {
    /// Parse a tag name.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion {
            tag: raw.to_string(),
        };

        let trimmed = raw.trim();
        let caps = VERSION_RE.captures(trimmed).ok_or_else(invalid)?;

        let core = caps["core"]
            .split('.')
            .map(|part| part.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        let suffix = caps
            .name("suffix")
            .map(|m| m.as_str())
            .unwrap_or_default()
            .split(['.', '-', '+', '_', '~'])
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<u64>() {
                Ok(n) if part.bytes().all(|b| b.is_ascii_digit()) => Segment::Number(n),
                _ => Segment::Text(part.to_string()),
            })
            .collect();

        Ok(Self {
            raw: trimmed.to_string(),
            core,
            suffix,
        })
    }

    /// The tag name as it appears in the repository.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn cmp_core(&self, other: &Self) -> Ordering {
        let len = self.core.len().max(other.core.len());
        (0..len)
            .map(|i| {
                let a = self.core.get(i).copied().unwrap_or(0);
                let b = other.core.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    fn cmp_suffix(&self, other: &Self) -> Ordering {
        match (self.suffix.is_empty(), other.suffix.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.suffix.cmp(&other.suffix),
        }
    }
}

impl Ord for VersionTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_core(other).then_with(|| self.cmp_suffix(other))
    }
}

impl PartialOrd for VersionTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionTag {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionTag {}

impl FromStr for VersionTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse raw tag names into versions sorted in ascending order.
///
/// Tags that are not versions are skipped with a warning. Duplicate raw names
/// are collapsed.
pub fn parse_tags<S: AsRef<str>>(tags: &[S]) -> Vec<VersionTag> {
    let mut versions: Vec<VersionTag> = Vec::with_capacity(tags.len());

    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || versions.iter().any(|v| v.raw == tag) {
            continue;
        }
        match VersionTag::parse(tag) {
            Ok(version) => versions.push(version),
            Err(_) => warn!("Ignoring tag '{}': not a version", tag),
        }
    }

    versions.sort();
    versions
}

/// Return the greatest version of an ascending list.
///
/// Returns `Ok(None)` for an empty list and [`Error::AmbiguousVersion`] when
/// the two greatest entries compare equal.
pub fn select_latest(sorted: &[VersionTag]) -> Result<Option<&VersionTag>> {
    match sorted {
        [] => Ok(None),
        [.., prev, last] if prev == last => Err(Error::AmbiguousVersion {
            first: prev.raw.clone(),
            second: last.raw.clone(),
        }),
        [.., last] => Ok(Some(last)),
    }
}

/// Use an explicitly requested version, bypassing tag comparison.
pub fn select_forced(explicit: &str) -> Result<VersionTag> {
    VersionTag::parse(explicit)
}

/// Pick the latest version from a mirror's raw tag listing.
///
/// `mirror` is only used for error context.
pub fn latest_from_tags<S: AsRef<str>>(mirror: &Path, tags: &[S]) -> Result<VersionTag> {
    if tags.iter().all(|t| t.as_ref().trim().is_empty()) {
        return Err(Error::NoTags {
            path: mirror.to_path_buf(),
        });
    }

    let versions = parse_tags(tags);
    select_latest(&versions)?
        .cloned()
        .ok_or_else(|| Error::NoVersionTags {
            path: mirror.to_path_buf(),
            count: tags.len(),
        })
}
