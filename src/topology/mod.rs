pub mod provenance;
pub mod replacement;

pub use provenance::Provenance;
pub use replacement::ReplacementRecord;

use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::{Location, Segment};

/// Mutable working graph: a segment set plus the adjacency index it implies.
///
/// The two are only ever changed together through [`WireGraph::insert`] and
/// [`WireGraph::remove`], so the index always matches the segment set.
/// Locations with no incident segment are dropped from the index.
#[derive(Debug, Default, Clone)]
pub struct WireGraph {
    segments: BTreeSet<Segment>,
    adjacency: BTreeMap<Location, BTreeSet<Segment>>,
}

impl WireGraph {
    /// Creates a new, empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph and its adjacency index from a segment set.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = Segment>,
    {
        let mut graph = Self::new();
        for segment in segments {
            graph.insert(segment);
        }
        graph
    }

    /// Inserts a segment, returning `false` if it was already present.
    pub fn insert(&mut self, segment: Segment) -> bool {
        if !self.segments.insert(segment) {
            return false;
        }
        for end in segment.ends() {
            self.adjacency.entry(end).or_default().insert(segment);
        }
        true
    }

    /// Removes a segment, returning `false` if it was not present.
    pub fn remove(&mut self, segment: &Segment) -> bool {
        if !self.segments.remove(segment) {
            return false;
        }
        for end in segment.ends() {
            if let Some(incident) = self.adjacency.get_mut(&end) {
                incident.remove(segment);
                if incident.is_empty() {
                    self.adjacency.remove(&end);
                }
            }
        }
        true
    }

    /// Returns `true` if the segment is currently present.
    #[must_use]
    pub fn contains(&self, segment: &Segment) -> bool {
        self.segments.contains(segment)
    }

    /// Number of segments incident to `loc` (zero if none).
    #[must_use]
    pub fn degree(&self, loc: Location) -> usize {
        self.adjacency.get(&loc).map_or(0, BTreeSet::len)
    }

    /// Iterates the segments incident to `loc`.
    pub fn incident(&self, loc: Location) -> impl Iterator<Item = &Segment> {
        self.adjacency.get(&loc).into_iter().flatten()
    }

    /// Returns the far endpoints of all segments incident to `loc`.
    #[must_use]
    pub fn neighbors(&self, loc: Location) -> Vec<Location> {
        self.incident(loc).map(|s| s.other_end(loc)).collect()
    }

    /// Iterates every location with at least one incident segment.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.adjacency.keys().copied()
    }

    /// Iterates the current segments in canonical order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the graph has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
