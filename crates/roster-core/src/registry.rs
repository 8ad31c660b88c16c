//! The ordered string registry.
//!
//! Entries keep the ID they were allocated at creation. The key a caller
//! sees is computed on demand:
//!
//! ```text
//! position:   0    1    2  │  3    4
//! key:        0    1    2  │  7    8     ← allocated IDs
//!             └ settled ───┘  └ appended since the last structural change
//! ```
//!
//! Every removal or duplication settles the whole sequence, so afterwards
//! each key equals its position. Appends never disturb earlier positions and
//! show their allocated ID until the next structural change.

use std::marker::PhantomData;

use crate::identity::{DisplayId, EntryId, IdentityScheme, SyntheticIdentity};
use crate::render::{normalize, render_sentence};

/// One stored value plus the ID it was allocated with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    value: String,
    origin: EntryId,
}

impl Entry {
    pub fn value(&self) -> &str {
        &self.value
    }

    /// ID allocated when this entry (or the entry it was duplicated from)
    /// was added.
    pub fn origin(&self) -> EntryId {
        self.origin
    }
}

/// Read-only view of an entry at its current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryView<'a> {
    pub position: usize,
    pub key: DisplayId,
    pub origin: EntryId,
    pub value: &'a str,
}

/// Ordered sequence of lowercase strings.
///
/// `S` picks how `remove` and `duplicate` resolve their key. Each registry
/// owns its ID allocator; two registries never share IDs or state.
#[derive(Debug, Clone)]
pub struct Registry<S: IdentityScheme = SyntheticIdentity> {
    entries: Vec<Entry>,
    next_id: u64,
    /// Length of the prefix whose keys equal their positions.
    settled: usize,
    scheme: PhantomData<S>,
}

impl<S: IdentityScheme> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: IdentityScheme> Registry<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            settled: 0,
            scheme: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowercase `text` and append it.
    ///
    /// Allocates the next ID. Returns the key the new entry is shown with.
    pub fn add(&mut self, text: &str) -> DisplayId {
        let origin = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            value: normalize(text),
            origin,
        });
        tracing::trace!(origin = origin.0, len = self.entries.len(), "registry add");
        DisplayId::from(origin)
    }

    /// Remove the final entry. No-op on an empty registry.
    pub fn remove_last(&mut self) -> Option<String> {
        let removed = self.entries.pop();
        self.settle();
        removed.map(|entry| entry.value)
    }

    /// Remove the first entry addressed by `key`.
    ///
    /// Returns the removed value, or `None` (registry untouched) on a miss.
    pub fn remove(&mut self, key: &S::Key) -> Option<String> {
        let Some(position) = self.position_of(key) else {
            tracing::debug!(?key, scheme = S::KIND.as_str(), "remove: no matching entry");
            return None;
        };
        let entry = self.entries.remove(position);
        self.settle();
        Some(entry.value)
    }

    /// Insert a copy of the first entry addressed by `key` right after it.
    ///
    /// The copy inherits the source's origin; it is not allocated a new ID.
    /// Returns the copy's position, or `None` (registry untouched) on a miss.
    pub fn duplicate(&mut self, key: &S::Key) -> Option<usize> {
        let Some(position) = self.position_of(key) else {
            tracing::debug!(?key, scheme = S::KIND.as_str(), "duplicate: no matching entry");
            return None;
        };
        let copy = self.entries[position].clone();
        self.entries.insert(position + 1, copy);
        self.settle();
        Some(position + 1)
    }

    /// Values joined with `", "`, first character uppercased.
    pub fn render(&self) -> String {
        render_sentence(self.values())
    }

    /// Stored values in order.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.value.as_str())
    }

    /// Entries in order, each with its current displayed key.
    pub fn entries(&self) -> impl Iterator<Item = EntryView<'_>> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, entry)| self.view(position, entry))
    }

    /// Position of the first entry addressed by `key`.
    pub fn position_of(&self, key: &S::Key) -> Option<usize> {
        self.entries().position(|view| S::matches(&view, key))
    }

    fn view<'a>(&self, position: usize, entry: &'a Entry) -> EntryView<'a> {
        EntryView {
            position,
            key: self.display_id(position, entry),
            origin: entry.origin,
            value: &entry.value,
        }
    }

    fn display_id(&self, position: usize, entry: &Entry) -> DisplayId {
        if position < self.settled {
            DisplayId::from(position)
        } else {
            DisplayId::from(entry.origin)
        }
    }

    fn settle(&mut self) {
        self.settled = self.entries.len();
        tracing::trace!(settled = self.settled, "registry reindexed");
    }
}

impl Registry<SyntheticIdentity> {
    /// Displayed key of the entry at `index`, or `None` when out of range.
    pub fn key_at(&self, index: usize) -> Option<DisplayId> {
        self.entries
            .get(index)
            .map(|entry| self.display_id(index, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ValueIdentity;

    fn keys(registry: &Registry) -> Vec<u64> {
        registry.entries().map(|view| view.key.get()).collect()
    }

    fn values<S: IdentityScheme>(registry: &Registry<S>) -> Vec<&str> {
        registry.values().collect()
    }

    #[test]
    fn add_lowercases_and_appends() {
        let mut registry: Registry = Registry::new();
        registry.add("MiXeD");
        registry.add("");
        assert_eq!(values(&registry), ["mixed", ""]);
    }

    #[test]
    fn appended_entries_show_allocated_ids() {
        let mut registry: Registry = Registry::new();
        assert_eq!(registry.add("x"), DisplayId(0));
        assert_eq!(registry.add("y"), DisplayId(1));
        assert_eq!(registry.add("z"), DisplayId(2));
        assert_eq!(keys(&registry), [0, 1, 2]);
    }

    #[test]
    fn remove_by_id_reindexes_survivors() {
        let mut registry: Registry = Registry::new();
        for word in ["x", "y", "z"] {
            registry.add(word);
        }
        assert_eq!(registry.remove(&DisplayId(1)), Some("y".to_string()));
        assert_eq!(values(&registry), ["x", "z"]);
        assert_eq!(keys(&registry), [0, 1]);
    }

    #[test]
    fn allocation_keeps_advancing_after_reindex() {
        let mut registry: Registry = Registry::new();
        for word in ["x", "y", "z"] {
            registry.add(word);
        }
        registry.remove(&DisplayId(1));
        assert_eq!(registry.add("w"), DisplayId(3));
        assert_eq!(keys(&registry), [0, 1, 3]);

        // Key 2 is no longer shown by anyone.
        assert_eq!(registry.remove(&DisplayId(2)), None);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn duplicate_inserts_after_source_and_reindexes() {
        let mut registry: Registry = Registry::new();
        for word in ["x", "y", "z"] {
            registry.add(word);
        }
        assert_eq!(registry.duplicate(&DisplayId(1)), Some(2));
        assert_eq!(values(&registry), ["x", "y", "y", "z"]);
        assert_eq!(keys(&registry), [0, 1, 2, 3]);
        assert_eq!(registry.add("w"), DisplayId(3));
        assert_eq!(keys(&registry), [0, 1, 2, 3, 3]);
    }

    #[test]
    fn duplicate_copy_inherits_origin() {
        let mut registry: Registry = Registry::new();
        registry.add("x");
        registry.duplicate(&DisplayId(0));
        let origins: Vec<EntryId> = registry.entries().map(|view| view.origin).collect();
        assert_eq!(origins, [EntryId(0), EntryId(0)]);
    }

    #[test]
    fn misses_leave_registry_untouched() {
        let mut registry: Registry = Registry::new();
        registry.add("x");
        let before = registry.clone();
        assert_eq!(registry.remove(&DisplayId(9)), None);
        assert_eq!(registry.duplicate(&DisplayId(9)), None);
        assert_eq!(registry.entries, before.entries);
        assert_eq!(registry.settled, before.settled);
    }

    #[test]
    fn remove_last_on_empty_is_noop() {
        let mut registry: Registry = Registry::new();
        assert_eq!(registry.remove_last(), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_last_settles_remaining_entries() {
        let mut registry: Registry = Registry::new();
        for word in ["x", "y", "z"] {
            registry.add(word);
        }
        registry.remove(&DisplayId(0));
        registry.add("w");
        assert_eq!(keys(&registry), [0, 1, 3]);
        assert_eq!(registry.remove_last(), Some("w".to_string()));
        assert_eq!(keys(&registry), [0, 1]);
    }

    #[test]
    fn key_at_returns_none_out_of_range() {
        let mut registry: Registry = Registry::new();
        registry.add("x");
        assert_eq!(registry.key_at(0), Some(DisplayId(0)));
        assert_eq!(registry.key_at(1), None);
    }

    #[test]
    fn value_identity_targets_first_match() {
        let mut registry: Registry<ValueIdentity> = Registry::new();
        for word in ["x", "y", "z"] {
            registry.add(word);
        }
        assert_eq!(registry.duplicate("y"), Some(2));
        registry.add("Y");
        assert_eq!(values(&registry), ["x", "y", "y", "z", "y"]);
        assert_eq!(registry.position_of("y"), Some(1));

        assert_eq!(registry.remove("Y"), Some("y".to_string()));
        assert_eq!(values(&registry), ["x", "y", "z", "y"]);
    }

    #[test]
    fn registries_do_not_share_allocation() {
        let mut first: Registry = Registry::new();
        let mut second: Registry = Registry::new();
        first.add("a");
        first.add("b");
        assert_eq!(second.add("c"), DisplayId(0));
    }
}
