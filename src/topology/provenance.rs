use std::collections::BTreeMap;

use crate::geometry::Segment;

/// For every working segment, the ordered original segments it descends from.
///
/// Merges concatenate lists, so a segment produced by two successive
/// collapses still names every original it replaced, in path order.
#[derive(Debug, Default, Clone)]
pub struct Provenance {
    origins: BTreeMap<Segment, Vec<Segment>>,
}

impl Provenance {
    /// Seeds provenance so each segment descends from itself.
    pub fn seed<'a, I>(segments: I) -> Self
    where
        I: IntoIterator<Item = &'a Segment>,
    {
        let origins = segments.into_iter().map(|&s| (s, vec![s])).collect();
        Self { origins }
    }

    /// Returns the originals of a working segment (empty if unknown).
    #[must_use]
    pub fn originals(&self, segment: &Segment) -> &[Segment] {
        self.origins.get(segment).map_or(&[], Vec::as_slice)
    }

    /// Removes a working segment, returning its originals.
    pub fn take(&mut self, segment: &Segment) -> Vec<Segment> {
        self.origins.remove(segment).unwrap_or_default()
    }

    /// Replaces `parts` by `merged`, concatenating their originals in order.
    pub fn merge(&mut self, parts: &[Segment], merged: Segment) {
        let mut combined = Vec::new();
        for part in parts {
            combined.extend(self.take(part));
        }
        self.origins.insert(merged, combined);
    }

    /// Iterates `(working segment, originals)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&Segment, &[Segment])> {
        self.origins.iter().map(|(s, o)| (s, o.as_slice()))
    }

    /// Number of tracked working segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    /// Returns `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}
