//! Identity schemes for registry entries.
//!
//! Two schemes exist:
//! - [`ValueIdentity`]: an entry is found by its own content. Duplicates are
//!   indistinguishable and lookups hit the first match.
//! - [`SyntheticIdentity`]: an entry is found by its displayed integer ID.
//!
//! Every entry carries an [`EntryId`] allocated when it was added, whatever
//! the scheme. What callers see is the [`DisplayId`], derived from the
//! entry's position and the registry's settled prefix
//! (see [`crate::registry::Registry`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownIdentityKind;
use crate::registry::EntryView;

/// ID allocated to an entry at creation time.
///
/// Allocation is per registry and strictly increasing; values are never
/// reused, even after the entry is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

/// Integer key shown to callers of a synthetic registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(pub u64);

impl DisplayId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<EntryId> for DisplayId {
    fn from(id: EntryId) -> Self {
        Self(id.0)
    }
}

impl From<usize> for DisplayId {
    fn from(position: usize) -> Self {
        Self(position as u64)
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime tag for the two identity schemes.
///
/// Deserializes through [`FromStr`], so config files, JSON payloads and CLI
/// flags accept the same spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum IdentityKind {
    Value,
    #[default]
    Synthetic,
}

impl IdentityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityKind {
    type Err = UnknownIdentityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "value" => Ok(Self::Value),
            "synthetic" => Ok(Self::Synthetic),
            other => Err(UnknownIdentityKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for IdentityKind {
    type Error = UnknownIdentityKind;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// How a registry resolves a caller-supplied key to an entry.
pub trait IdentityScheme: fmt::Debug + Clone + Default {
    /// Key type accepted by `remove` and `duplicate`.
    type Key: ?Sized + fmt::Debug;

    const KIND: IdentityKind;

    /// Whether `entry` is addressed by `key`.
    fn matches(entry: &EntryView<'_>, key: &Self::Key) -> bool;
}

/// Entries are addressed by their content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueIdentity;

impl IdentityScheme for ValueIdentity {
    type Key = str;

    const KIND: IdentityKind = IdentityKind::Value;

    /// Stored values are ASCII-lowercased, so a case-insensitive ASCII
    /// comparison equals comparing against the normalized key.
    fn matches(entry: &EntryView<'_>, key: &str) -> bool {
        entry.value.eq_ignore_ascii_case(key)
    }
}

/// Entries are addressed by their displayed integer ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticIdentity;

impl IdentityScheme for SyntheticIdentity {
    type Key = DisplayId;

    const KIND: IdentityKind = IdentityKind::Synthetic;

    fn matches(entry: &EntryView<'_>, key: &DisplayId) -> bool {
        entry.key == *key
    }
}
