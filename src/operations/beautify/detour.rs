use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, trace};

use crate::geometry::{Location, Segment};

use super::BeautifyRun;

/// A three-segment path `a-b-c-d` that can become the straight wire `a-d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Detour {
    path: [Segment; 3],
    straight: Segment,
}

/// Collapses C-shaped detours into straight segments in one sweep.
///
/// The inner points `b` and `c` must be non-terminal with exactly two
/// connections; the outer points may be terminals (half-C). The straight
/// replacement must not exist yet, must not overlap any other wire and must
/// not pass over any wire end or terminal. Each straight segment is produced
/// at most once per sweep.
///
/// A collapse changes the neighbourhood of `a` and `d` and frees the space
/// the old path occupied, so the sweep revisits the points around the new
/// straight together with every candidate it rejected so far. When the
/// worklist drains, no collapsible detour is left. Returns the number of
/// detours collapsed.
pub(crate) fn simplify_detours(run: &mut BeautifyRun) -> usize {
    if run.graph.is_empty() {
        return 0;
    }

    let mut pending: VecDeque<Location> = run.graph.locations().collect();
    let mut rejected: BTreeSet<Location> = BTreeSet::new();
    let mut done: BTreeSet<Segment> = BTreeSet::new();
    let mut collapsed = 0;

    while let Some(b) = pending.pop_front() {
        if !is_inner_point(run, b) {
            continue;
        }
        let detour = match find_detour(run, b) {
            Some(detour) if done.insert(detour.straight) => detour,
            _ => {
                rejected.insert(b);
                continue;
            }
        };
        for part in &detour.path {
            run.graph.remove(part);
        }
        run.graph.insert(detour.straight);
        run.provenance.merge(&detour.path, detour.straight);
        trace!(straight = %detour.straight, "collapse detour");
        collapsed += 1;

        for end in detour.straight.ends() {
            pending.push_back(end);
            pending.extend(run.graph.neighbors(end));
        }
        pending.extend(std::mem::take(&mut rejected));
    }

    if collapsed > 0 {
        debug!(collapsed, "detours simplified");
    }
    collapsed
}

fn is_inner_point(run: &BeautifyRun, loc: Location) -> bool {
    !run.is_terminal(loc) && run.graph.degree(loc) == 2
}

/// Finds a collapsible detour whose first inner point is `b`.
///
/// Both neighbors of `b` are tried as the second inner point.
fn find_detour(run: &BeautifyRun, b: Location) -> Option<Detour> {
    if !is_inner_point(run, b) {
        return None;
    }
    let neighbors = run.graph.neighbors(b);
    let &[n0, n1] = neighbors.as_slice() else {
        return None;
    };
    detour_through(run, n0, b, n1).or_else(|| detour_through(run, n1, b, n0))
}

fn detour_through(run: &BeautifyRun, a: Location, b: Location, c: Location) -> Option<Detour> {
    if !is_inner_point(run, c) {
        return None;
    }
    let d = run
        .graph
        .neighbors(c)
        .into_iter()
        .find(|&n| n != b)?;
    if a == d || !a.shares_axis(&d) {
        return None;
    }

    let path = [
        Segment::new(a, b).ok()?,
        Segment::new(b, c).ok()?,
        Segment::new(c, d).ok()?,
    ];
    if !path.iter().all(|s| run.graph.contains(s)) {
        return None;
    }

    let straight = Segment::new(a, d).ok()?;
    if run.graph.contains(&straight) {
        return None;
    }
    let overlaps = run
        .graph
        .segments()
        .filter(|s| !path.contains(*s))
        .any(|s| straight.overlaps(s));
    if overlaps {
        return None;
    }
    // A wire end or terminal inside the straight would be joined to the net.
    let covers_point = run
        .graph
        .locations()
        .filter(|&p| p != b && p != c)
        .chain(run.terminals.iter().copied())
        .any(|p| straight.contains_interior(p));
    if covers_point {
        return None;
    }

    Some(Detour { path, straight })
}
