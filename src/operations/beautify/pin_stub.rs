use tracing::{debug, trace};

use crate::geometry::Segment;

use super::BeautifyRun;

/// Removes dead-end wires hanging off terminals until none are left.
///
/// A stub has exactly one terminal endpoint and its other endpoint has no
/// further connection. Removing one can expose the next link of a chain, so
/// scans repeat until a full scan removes nothing. Returns the number of
/// segments removed.
pub(crate) fn remove_pin_stubs(run: &mut BeautifyRun) -> usize {
    let mut total = 0;
    loop {
        let removed = stub_pass(run);
        if removed == 0 {
            break;
        }
        total += removed;
    }
    if total > 0 {
        debug!(removed = total, "pin stubs removed");
    }
    total
}

/// One scan over the working set; returns the number of stubs removed.
fn stub_pass(run: &mut BeautifyRun) -> usize {
    let view: &BeautifyRun = run;
    let stubs: Vec<Segment> = view
        .graph
        .segments()
        .filter(|s| is_stub(view, s))
        .copied()
        .collect();
    for stub in &stubs {
        trace!(%stub, "remove pin stub");
        run.delete(stub);
    }
    stubs.len()
}

fn is_stub(run: &BeautifyRun, segment: &Segment) -> bool {
    let [a, b] = segment.ends();
    match (run.is_terminal(a), run.is_terminal(b)) {
        (true, false) => run.graph.degree(b) == 1,
        (false, true) => run.graph.degree(a) == 1,
        _ => false,
    }
}
