use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::Segment;

/// Maps each original segment to the segments that replace it.
///
/// An empty set means the original is deleted; a singleton means it survives,
/// possibly as a different (merged) segment. Each original appears at most
/// once; a later entry for the same original overwrites the earlier one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplacementRecord {
    entries: BTreeMap<Segment, BTreeSet<Segment>>,
}

impl ReplacementRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `original` is removed with no replacement.
    pub fn delete(&mut self, original: Segment) {
        self.entries.insert(original, BTreeSet::new());
    }

    /// Records that `original` is replaced by the single segment `with`.
    pub fn replace_with(&mut self, original: Segment, with: Segment) {
        self.entries.insert(original, BTreeSet::from([with]));
    }

    /// Records that `original` is replaced by a set of segments.
    pub fn insert(&mut self, original: Segment, with: BTreeSet<Segment>) {
        self.entries.insert(original, with);
    }

    /// Returns the replacements recorded for `original`, if any.
    #[must_use]
    pub fn get(&self, original: &Segment) -> Option<&BTreeSet<Segment>> {
        self.entries.get(original)
    }

    /// Iterates `(original, replacements)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&Segment, &BTreeSet<Segment>)> {
        self.entries.iter()
    }

    /// Iterates the originals named by the record.
    pub fn originals(&self) -> impl Iterator<Item = &Segment> {
        self.entries.keys()
    }

    /// Collects every replacement segment across all entries.
    #[must_use]
    pub fn replacements(&self) -> BTreeSet<Segment> {
        self.entries.values().flatten().copied().collect()
    }

    /// Returns `true` if every original maps to exactly itself.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.entries
            .iter()
            .all(|(orig, with)| with.len() == 1 && with.contains(orig))
    }

    /// Number of originals in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the record names no original.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
