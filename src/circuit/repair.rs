use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::Result;
use crate::geometry::{Location, Segment};
use crate::topology::ReplacementRecord;
use crate::transaction::{LocalRepair, MutationSink, NetworkSource};

/// Restores per-point wiring invariants after a coarse rewrite.
///
/// Collinear wires that overlap are merged into one run per supporting line,
/// and every run is split at each wire endpoint or component end lying on
/// it. The result has no overlapping wires and no T-junction hidden in the
/// interior of a wire. Perpendicular crossings stay unconnected.
#[derive(Debug, Default, Clone, Copy)]
pub struct WireRepair;

/// A supporting line: a row (`Horizontal(y)`) or a column (`Vertical(x)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Line {
    Horizontal(i32),
    Vertical(i32),
}

impl Line {
    fn of(segment: &Segment) -> Self {
        if segment.is_horizontal() {
            Line::Horizontal(segment.start().y)
        } else {
            Line::Vertical(segment.start().x)
        }
    }

    /// Position of `loc` along the line, if it lies on it.
    fn param(self, loc: Location) -> Option<i32> {
        match self {
            Line::Horizontal(y) => (loc.y == y).then_some(loc.x),
            Line::Vertical(x) => (loc.x == x).then_some(loc.y),
        }
    }

    fn at(self, t: i32) -> Location {
        match self {
            Line::Horizontal(y) => Location::new(t, y),
            Line::Vertical(x) => Location::new(x, t),
        }
    }

    fn extent(self, segment: &Segment) -> (i32, i32) {
        match self {
            Line::Horizontal(_) => (segment.start().x, segment.end().x),
            Line::Vertical(_) => (segment.start().y, segment.end().y),
        }
    }
}

impl WireRepair {
    /// Creates a new repair pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Computes the record that repairs `network`, without applying it.
    ///
    /// Only wires that actually change are named in the record.
    #[must_use]
    pub fn plan<N: NetworkSource + ?Sized>(&self, network: &N) -> ReplacementRecord {
        let wires = network.segments();

        let mut junctions: BTreeSet<Location> = network.terminal_ends().into_iter().collect();
        let mut lines: BTreeMap<Line, Vec<Segment>> = BTreeMap::new();
        for wire in &wires {
            junctions.extend(wire.ends());
            lines.entry(Line::of(wire)).or_default().push(*wire);
        }

        let mut record = ReplacementRecord::new();
        for (&line, members) in &lines {
            let mut extents: Vec<(i32, i32)> = members.iter().map(|s| line.extent(s)).collect();
            let runs = merge_intervals(&mut extents);

            let cuts: BTreeSet<i32> = junctions.iter().filter_map(|&j| line.param(j)).collect();
            let pieces = split_runs(line, &runs, &cuts);

            for wire in members {
                let covering: BTreeSet<Segment> = pieces
                    .iter()
                    .filter(|p| wire.contains(p.start()) && wire.contains(p.end()))
                    .copied()
                    .collect();
                if covering.len() != 1 || !covering.contains(wire) {
                    record.insert(*wire, covering);
                }
            }
        }
        record
    }
}

impl<N: NetworkSource + MutationSink + ?Sized> LocalRepair<N> for WireRepair {
    fn repair(&mut self, network: &mut N) -> Result<()> {
        let record = self.plan(network);
        if record.is_empty() {
            debug!("wire repair: nothing to do");
            return Ok(());
        }
        debug!(
            wires = record.len(),
            pieces = record.replacements().len(),
            "wire repair"
        );
        network.replace(&record)
    }
}

/// Merges overlapping or touching intervals and returns the union.
fn merge_intervals(intervals: &mut [(i32, i32)]) -> Vec<(i32, i32)> {
    intervals.sort_unstable();
    let mut merged: Vec<(i32, i32)> = Vec::new();
    for &(lo, hi) in intervals.iter() {
        match merged.last_mut() {
            Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }
    merged
}

/// Splits each run at every cut strictly inside it.
fn split_runs(line: Line, runs: &[(i32, i32)], cuts: &BTreeSet<i32>) -> Vec<Segment> {
    let mut pieces = Vec::new();
    for &(lo, hi) in runs {
        let mut from = lo;
        let inner = cuts.range(lo + 1..hi).copied();
        for to in inner.chain(std::iter::once(hi)) {
            if let Ok(piece) = Segment::new(line.at(from), line.at(to)) {
                pieces.push(piece);
            }
            from = to;
        }
    }
    pieces
}
