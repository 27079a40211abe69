//! Version tokens and their resolution against a slot sequence.
//!
//! Versions are 1-based: version `1` lives in slot `0`. Version `0` is the
//! state before any version existed and never resolves to a slot. Negative
//! numbers count back from the end, so `-1` is the latest version.
//!
//! # Examples
//!
//! ```
//! use afs_vfs::version::{Resolved, Version, resolve};
//!
//! assert_eq!(resolve(&Version::Index(1), 3).unwrap(), Resolved::Slot(0));
//! assert_eq!(resolve(&Version::Index(-1), 3).unwrap(), Resolved::Slot(2));
//! assert_eq!(resolve(&Version::Index(-4), 3).unwrap(), Resolved::Absent);
//! assert_eq!(
//!     resolve(&"beef".parse().unwrap(), 3).unwrap(),
//!     Resolved::Label("beef".to_string())
//! );
//! ```

use afs_core::{Error, Result};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A requested version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Version {
    /// Signed 1-based index; negative values count from the end.
    Index(i64),
    /// The highest existing version.
    Latest,
    /// Version 1.
    Earliest,
    /// Every version and label; only meaningful for deletion.
    All,
    /// A named alias.
    Label(String),
}

impl Version {
    /// Parses a version token.
    ///
    /// Strings of the form `[+-]digits` are numeric, `latest`, `earliest`
    /// and `*` are keywords, anything else is a label.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token {
            "latest" => Self::Latest,
            "earliest" => Self::Earliest,
            "*" => Self::All,
            _ => parse_index(token).map_or_else(|| Self::Label(token.to_string()), Self::Index),
        }
    }
}

fn parse_index(token: &str) -> Option<i64> {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

impl FromStr for Version {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<i64> for Version {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for Version {
    fn from(token: &str) -> Self {
        Self::parse(token)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(n) => write!(f, "{n}"),
            Self::Latest => f.write_str("latest"),
            Self::Earliest => f.write_str("earliest"),
            Self::All => f.write_str("*"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// Where a version lives in a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A 0-based slot index, possibly past the current end.
    Slot(usize),
    /// A key in the label map.
    Label(String),
    /// No version can exist here.
    Absent,
}

/// Resolves `version` against a sequence of `len` slots.
///
/// Out-of-range numeric values never fail; they yield [`Resolved::Absent`]
/// (or a slot past the end, for large positive indices). Labels are not
/// checked against the label map.
///
/// # Errors
///
/// Returns [`Error::IllegalVersion`] for [`Version::All`], which only the
/// delete path accepts.
pub fn resolve(version: &Version, len: usize) -> Result<Resolved> {
    let resolved = match version {
        Version::Index(n) => resolve_index(*n, len),
        Version::Latest => len.checked_sub(1).map_or(Resolved::Absent, Resolved::Slot),
        Version::Earliest => Resolved::Slot(0),
        Version::Label(label) => Resolved::Label(label.clone()),
        Version::All => {
            return Err(Error::IllegalVersion {
                version: version.to_string(),
            });
        }
    };
    Ok(resolved)
}

fn resolve_index(n: i64, len: usize) -> Resolved {
    match n {
        0 => Resolved::Absent,
        n if n > 0 => usize::try_from(n - 1).map_or(Resolved::Absent, Resolved::Slot),
        n => usize::try_from(n.unsigned_abs())
            .ok()
            .and_then(|back| len.checked_sub(back))
            .map_or(Resolved::Absent, Resolved::Slot),
    }
}
