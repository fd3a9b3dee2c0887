use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, trace};

use crate::geometry::{Location, Segment};

use super::BeautifyRun;

/// Removes wire sub-trees that connect to no terminal.
///
/// Each pass computes which locations can reach a terminal, traces every
/// path leaving a branch point, and drops paths that lead nowhere live.
/// Pruning one branch can strand another, so passes repeat until one removes
/// nothing. Returns the number of segments removed.
pub(crate) fn prune_dead_branches(run: &mut BeautifyRun) -> usize {
    let mut total = 0;
    loop {
        let removed = prune_pass(run);
        if removed == 0 {
            break;
        }
        total += removed;
    }
    if total > 0 {
        debug!(removed = total, "dead branches pruned");
    }
    total
}

/// Result of walking away from a branch point along one segment.
#[derive(Debug, Default)]
struct BranchWalk {
    segments: BTreeSet<Segment>,
    reaches_terminal: bool,
    neighbor_branch_points: BTreeSet<Location>,
}

impl BranchWalk {
    fn is_live(&self, live: &BTreeSet<Location>) -> bool {
        self.reaches_terminal
            || self
                .neighbor_branch_points
                .iter()
                .any(|bp| live.contains(bp))
    }
}

fn prune_pass(run: &mut BeautifyRun) -> usize {
    if run.graph.is_empty() {
        return 0;
    }

    let live = reachable_from_terminals(run);

    // Degree 2 pass-through points count as branch points here; collapsing
    // them is left to the detour pass.
    let branch_points: BTreeSet<Location> = run
        .graph
        .locations()
        .filter(|&loc| !run.is_terminal(loc) && run.graph.degree(loc) >= 2)
        .collect();

    let mut doomed: BTreeSet<Segment> = BTreeSet::new();
    let mut processed: BTreeSet<(Location, Location)> = BTreeSet::new();

    for &origin in &branch_points {
        for start in run.graph.incident(origin) {
            if !processed.insert((origin, start.other_end(origin))) {
                continue;
            }
            let walk = trace_branch(run, &branch_points, &live, origin, *start);
            if !walk.is_live(&live) {
                doomed.extend(walk.segments);
            }
        }
    }

    // Floating segments with no branch point at either end.
    for segment in run.graph.segments() {
        if doomed.contains(segment) {
            continue;
        }
        let [a, b] = segment.ends();
        if run.is_terminal(a) || run.is_terminal(b) {
            continue;
        }
        if run.graph.degree(a) == 1
            && run.graph.degree(b) == 1
            && !live.contains(&a)
            && !live.contains(&b)
        {
            doomed.insert(*segment);
        }
    }

    for segment in &doomed {
        trace!(%segment, "prune dead branch");
        run.delete(segment);
    }
    doomed.len()
}

/// Breadth-first search from every terminal over the working graph.
fn reachable_from_terminals(run: &BeautifyRun) -> BTreeSet<Location> {
    let mut live = run.terminals.clone();
    let mut queue: VecDeque<Location> = run.terminals.iter().copied().collect();
    while let Some(u) = queue.pop_front() {
        for segment in run.graph.incident(u) {
            let v = segment.other_end(u);
            if live.insert(v) {
                queue.push_back(v);
            }
        }
    }
    live
}

/// Walks depth-first from `origin` through `start`, never re-entering
/// `origin`, stopping at terminals and at other branch points.
fn trace_branch(
    run: &BeautifyRun,
    branch_points: &BTreeSet<Location>,
    live: &BTreeSet<Location>,
    origin: Location,
    start: Segment,
) -> BranchWalk {
    let first = start.other_end(origin);
    let mut walk = BranchWalk {
        segments: BTreeSet::from([start]),
        ..BranchWalk::default()
    };
    let mut visited: BTreeSet<Location> = BTreeSet::from([origin, first]);
    let mut stack = vec![first];

    while let Some(u) = stack.pop() {
        if run.is_terminal(u) {
            walk.reaches_terminal = true;
            break;
        }
        if branch_points.contains(&u) {
            walk.neighbor_branch_points.insert(u);
            if live.contains(&u) {
                break;
            }
            continue;
        }
        for segment in run.graph.incident(u) {
            if walk.segments.contains(segment) {
                continue;
            }
            let v = segment.other_end(u);
            if v == origin || visited.contains(&v) {
                continue;
            }
            walk.segments.insert(*segment);
            visited.insert(v);
            stack.push(v);
        }
    }
    walk
}
