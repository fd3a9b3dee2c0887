mod dead_branch;
mod detour;
mod pin_stub;

use std::collections::BTreeSet;

use tracing::{debug, info_span};

use crate::circuit::WireRepair;
use crate::error::Result;
use crate::geometry::{Location, Segment};
use crate::topology::{Provenance, ReplacementRecord, WireGraph};
use crate::transaction::{Access, LocalRepair, MutationSink, NetworkSource, NoRepair};

/// Selects which rewrite steps a [`Beautify`] run performs.
///
/// Disabled steps are skipped; the enabled ones keep their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BeautifyOptions {
    /// Collapse C-shaped detours before and after pruning.
    pub simplify_detours: bool,
    /// Remove dead-end wires hanging off terminals.
    pub remove_pin_stubs: bool,
    /// Remove wire sub-trees that reach no terminal.
    pub prune_dead_branches: bool,
    /// Run [`WireRepair`] after the commit.
    pub repair: bool,
}

impl Default for BeautifyOptions {
    fn default() -> Self {
        Self {
            simplify_detours: true,
            remove_pin_stubs: true,
            prune_dead_branches: true,
            repair: true,
        }
    }
}

/// Canonicalizes the wiring of a circuit.
///
/// Removes terminal stubs, prunes sub-trees that touch no terminal, and
/// collapses three-segment detours into straight wires, without breaking any
/// connection between terminals. The whole change is committed as a single
/// replacement record, after which a local repair pass restores per-point
/// invariants such as split T-junctions.
#[derive(Debug, Clone, Default)]
pub struct Beautify {
    wires: BTreeSet<Segment>,
    options: BeautifyOptions,
}

impl Beautify {
    /// Creates an operation over every wire of the circuit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an operation restricted to a selection of wires.
    ///
    /// An empty selection means every wire. Selected wires missing from the
    /// circuit are ignored.
    #[must_use]
    pub fn with_wires<I>(wires: I) -> Self
    where
        I: IntoIterator<Item = Segment>,
    {
        Self {
            wires: wires.into_iter().collect(),
            options: BeautifyOptions::default(),
        }
    }

    /// Replaces the step selection.
    #[must_use]
    pub fn options(mut self, options: BeautifyOptions) -> Self {
        self.options = options;
        self
    }

    /// Access the run needs to its circuit, for the host coordinator.
    #[must_use]
    pub fn access(&self) -> Access {
        Access::ReadWrite
    }

    /// Computes the replacement record without touching the circuit.
    #[must_use]
    pub fn plan<N: NetworkSource + ?Sized>(&self, network: &N) -> ReplacementRecord {
        let available = network.segments();
        let selection: BTreeSet<Segment> = if self.wires.is_empty() {
            available
        } else {
            self.wires.intersection(&available).copied().collect()
        };

        let mut run = BeautifyRun::new(network.terminal_ends(), selection);
        let opts = self.options;

        if opts.simplify_detours {
            detour::simplify_detours(&mut run);
        }
        loop {
            let mut removed = 0;
            if opts.remove_pin_stubs {
                removed += pin_stub::remove_pin_stubs(&mut run);
            }
            if opts.prune_dead_branches {
                removed += dead_branch::prune_dead_branches(&mut run);
            }
            if removed == 0 {
                break;
            }
        }
        if opts.simplify_detours {
            detour::simplify_detours(&mut run);
        }

        run.into_record()
    }

    /// Executes the operation, running [`WireRepair`] afterwards if enabled.
    ///
    /// Returns the committed record, which is empty if nothing was selected.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the commit is rejected (for example a
    /// `TransactionError::Conflict`); the circuit is then unchanged and the
    /// repair pass does not run.
    pub fn execute<N>(&self, network: &mut N) -> Result<ReplacementRecord>
    where
        N: NetworkSource + MutationSink,
    {
        if self.options.repair {
            self.execute_with(network, &mut WireRepair::new())
        } else {
            self.execute_with(network, &mut NoRepair)
        }
    }

    /// Executes the operation with a caller-supplied repair pass.
    ///
    /// The repair runs exactly once, after the commit step, regardless of
    /// [`BeautifyOptions::repair`].
    ///
    /// # Errors
    ///
    /// Returns an error if the commit or the repair fails.
    pub fn execute_with<N, R>(&self, network: &mut N, repair: &mut R) -> Result<ReplacementRecord>
    where
        N: NetworkSource + MutationSink,
        R: LocalRepair<N>,
    {
        let span = info_span!("beautify", selected = self.wires.len());
        let _enter = span.enter();

        let record = self.plan(network);
        if record.is_empty() {
            debug!("nothing to commit");
        } else {
            debug!(
                originals = record.len(),
                survivors = record.replacements().len(),
                "commit"
            );
            network.replace(&record)?;
        }
        repair.repair(network)?;
        Ok(record)
    }
}

/// State private to one run: terminals, working graph, provenance and the
/// replacement record built so far.
#[derive(Debug)]
pub(crate) struct BeautifyRun {
    pub(crate) terminals: BTreeSet<Location>,
    pub(crate) graph: WireGraph,
    pub(crate) provenance: Provenance,
    pub(crate) replacement: ReplacementRecord,
}

impl BeautifyRun {
    pub(crate) fn new<T, S>(terminals: T, selection: S) -> Self
    where
        T: IntoIterator<Item = Location>,
        S: IntoIterator<Item = Segment>,
    {
        let graph = WireGraph::from_segments(selection);
        let provenance = Provenance::seed(graph.segments());
        Self {
            terminals: terminals.into_iter().collect(),
            graph,
            provenance,
            replacement: ReplacementRecord::new(),
        }
    }

    pub(crate) fn is_terminal(&self, loc: Location) -> bool {
        self.terminals.contains(&loc)
    }

    /// Removes a working segment and records its originals as deleted.
    pub(crate) fn delete(&mut self, segment: &Segment) {
        self.graph.remove(segment);
        for original in self.provenance.take(segment) {
            self.replacement.delete(original);
        }
    }

    /// Maps each survivor's first original to it and the rest to nothing.
    pub(crate) fn into_record(self) -> ReplacementRecord {
        let mut record = self.replacement;
        for (survivor, originals) in self.provenance.iter() {
            let Some((first, rest)) = originals.split_first() else {
                continue;
            };
            record.replace_with(*first, *survivor);
            for original in rest {
                record.delete(*original);
            }
        }
        record
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::{BTreeMap, VecDeque};

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::circuit::{Circuit, ComponentData};
    use crate::error::{TransactionError, WireError};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn loc(x: i32, y: i32) -> Location {
        Location::new(x, y)
    }

    fn seg(x0: i32, y0: i32, x1: i32, y1: i32) -> Segment {
        Segment::new(loc(x0, y0), loc(x1, y1)).unwrap()
    }

    fn circuit_with(pins: &[Location], wires: &[Segment]) -> Circuit {
        let mut circuit = Circuit::new();
        for (i, &p) in pins.iter().enumerate() {
            circuit.add_component(ComponentData::pin(format!("pin{i}"), p));
        }
        for w in wires {
            circuit.add_wire(*w);
        }
        circuit
    }

    /// Pairs of terminals joined by some wire path.
    fn connected_pairs(circuit: &Circuit) -> BTreeSet<(Location, Location)> {
        let mut adjacency: BTreeMap<Location, Vec<Location>> = BTreeMap::new();
        for w in circuit.wires() {
            adjacency.entry(w.start()).or_default().push(w.end());
            adjacency.entry(w.end()).or_default().push(w.start());
        }
        let terminals: BTreeSet<Location> = circuit.terminal_ends().into_iter().collect();
        let mut pairs = BTreeSet::new();
        for &t in &terminals {
            let mut seen = BTreeSet::from([t]);
            let mut queue = VecDeque::from([t]);
            while let Some(u) = queue.pop_front() {
                for &v in adjacency.get(&u).into_iter().flatten() {
                    if seen.insert(v) {
                        queue.push_back(v);
                    }
                }
            }
            for &other in &terminals {
                if other > t && seen.contains(&other) {
                    pairs.insert((t, other));
                }
            }
        }
        pairs
    }

    /// Number of wire components with no terminal on them.
    fn terminal_free_components(circuit: &Circuit) -> usize {
        let mut adjacency: BTreeMap<Location, Vec<Location>> = BTreeMap::new();
        for w in circuit.wires() {
            adjacency.entry(w.start()).or_default().push(w.end());
            adjacency.entry(w.end()).or_default().push(w.start());
        }
        let terminals: BTreeSet<Location> = circuit.terminal_ends().into_iter().collect();
        let mut seen = BTreeSet::new();
        let mut count = 0;
        for &start in adjacency.keys() {
            if !seen.insert(start) {
                continue;
            }
            let mut has_terminal = false;
            let mut queue = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                has_terminal |= terminals.contains(&u);
                for &v in &adjacency[&u] {
                    if seen.insert(v) {
                        queue.push_back(v);
                    }
                }
            }
            if !has_terminal {
                count += 1;
            }
        }
        count
    }

    /// Random unit wires on a 6x6 lattice with a handful of pins.
    fn generated_circuit(seed: u64) -> Circuit {
        const SIDE: i32 = 6;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut wires = Vec::new();
        for x in 0..SIDE {
            for y in 0..SIDE {
                if x + 1 < SIDE && rng.random_bool(0.55) {
                    wires.push(seg(x * 10, y * 10, x * 10 + 10, y * 10));
                }
                if y + 1 < SIDE && rng.random_bool(0.55) {
                    wires.push(seg(x * 10, y * 10, x * 10, y * 10 + 10));
                }
            }
        }
        let pin_count = rng.random_range(2..=5);
        let pins: Vec<Location> = (0..pin_count)
            .map(|_| loc(rng.random_range(0..SIDE) * 10, rng.random_range(0..SIDE) * 10))
            .collect();
        circuit_with(&pins, &wires)
    }

    /// Three pins with a detour, a stub, a dangling arm and a dead cluster.
    ///
    /// ```text
    ///  C (20,40)
    ///    |
    ///  (0,20)---(20,20)      dead cluster at (100,100)
    ///  |  \ arm to (-10,20)
    ///  A (0,0)          B (40,0)--stub--(50,0)
    ///  |                |
    ///  (0,-10)-------(40,-10)
    /// ```
    fn mixed_circuit() -> Circuit {
        circuit_with(
            &[loc(0, 0), loc(40, 0), loc(20, 40)],
            &[
                seg(0, 0, 0, -10),
                seg(0, -10, 40, -10),
                seg(40, -10, 40, 0),
                seg(40, 0, 50, 0),
                seg(20, 40, 20, 20),
                seg(20, 20, 0, 20),
                seg(0, 20, 0, 0),
                seg(0, 20, -10, 20),
                seg(100, 100, 110, 100),
                seg(110, 100, 110, 110),
                seg(110, 100, 120, 100),
            ],
        )
    }

    #[test]
    fn mixed_circuit_is_canonicalized() {
        init_tracing();
        let mut circuit = mixed_circuit();
        let record = Beautify::new().execute(&mut circuit).unwrap();

        let straight = seg(0, 0, 40, 0);
        let expected = BTreeSet::from([
            straight,
            seg(20, 40, 20, 20),
            seg(20, 20, 0, 20),
            seg(0, 20, 0, 0),
        ]);
        assert_eq!(circuit.wires(), &expected);

        assert_eq!(record.len(), 11, "every selected wire appears once");
        assert_eq!(record.get(&seg(0, 0, 0, -10)).unwrap(), &BTreeSet::from([straight]));
        assert!(record.get(&seg(0, -10, 40, -10)).unwrap().is_empty());
        assert!(record.get(&seg(40, 0, 50, 0)).unwrap().is_empty());
        assert!(record.get(&seg(0, 20, -10, 20)).unwrap().is_empty());
        assert!(record.get(&seg(110, 100, 120, 100)).unwrap().is_empty());
    }

    #[test]
    fn connectivity_preserved() {
        let mut circuit = mixed_circuit();
        let before = connected_pairs(&circuit);
        assert_eq!(before.len(), 3);
        Beautify::new().execute(&mut circuit).unwrap();
        assert_eq!(connected_pairs(&circuit), before);
    }

    #[test]
    fn second_run_changes_nothing() {
        let mut circuit = mixed_circuit();
        Beautify::new().execute(&mut circuit).unwrap();
        let first = circuit.wires().clone();

        let record = Beautify::new().execute(&mut circuit).unwrap();
        assert!(record.is_identity(), "second run should only rename wires to themselves");
        assert_eq!(circuit.wires(), &first);
    }

    #[test]
    fn detour_exposed_late_in_final_sweep_is_collapsed() {
        init_tracing();
        let wires = [
            seg(0, 0, 0, 10),
            seg(0, 10, 0, 30),
            seg(0, 10, 10, 10),
            seg(10, 10, 20, 10),
            seg(10, 30, 10, 40),
            seg(10, 40, 30, 40),
            seg(20, 10, 30, 10),
            seg(20, 20, 30, 20),
            seg(30, 10, 40, 10),
            seg(30, 20, 30, 40),
            seg(30, 20, 40, 20),
            seg(40, 0, 40, 10),
            seg(40, 10, 40, 20),
        ];
        let pins = [loc(10, 0), loc(10, 10), loc(20, 10), loc(20, 20), loc(30, 0)];
        let mut circuit = circuit_with(&pins, &wires);
        Beautify::new().execute(&mut circuit).unwrap();
        let expected = BTreeSet::from([seg(10, 10, 20, 10), seg(20, 10, 20, 20)]);
        assert_eq!(circuit.wires(), &expected);

        let record = Beautify::new().execute(&mut circuit).unwrap();
        assert!(record.is_identity());
        assert_eq!(circuit.wires(), &expected);
    }

    #[test]
    fn detour_over_foreign_pin_is_kept() {
        let wires = [seg(10, 0, 10, 30), seg(10, 30, 30, 30), seg(30, 30, 30, 0)];
        let mut circuit = circuit_with(&[loc(10, 0), loc(30, 0), loc(20, 0)], &wires);
        let before = connected_pairs(&circuit);
        let record = Beautify::new().execute(&mut circuit).unwrap();
        assert!(record.is_identity());
        assert_eq!(circuit.wires(), &BTreeSet::from(wires));
        assert_eq!(connected_pairs(&circuit), before);
    }

    #[test]
    fn generated_networks_keep_invariants() {
        init_tracing();
        for seed in 0..500 {
            let mut circuit = generated_circuit(seed);
            let before = connected_pairs(&circuit);

            Beautify::new().execute(&mut circuit).unwrap();
            assert_eq!(connected_pairs(&circuit), before, "seed {seed}: connectivity changed");
            assert_eq!(terminal_free_components(&circuit), 0, "seed {seed}: dead component left");

            let first = circuit.wires().clone();
            let record = Beautify::new().execute(&mut circuit).unwrap();
            assert!(record.is_identity(), "seed {seed}: second run rewrote wires");
            assert_eq!(circuit.wires(), &first, "seed {seed}");
        }
    }

    #[test]
    fn terminals_untouched() {
        let mut circuit = mixed_circuit();
        let mut before = circuit.terminal_ends();
        before.sort();
        Beautify::new().execute(&mut circuit).unwrap();
        let mut after = circuit.terminal_ends();
        after.sort();
        assert_eq!(before, after);
        for t in [loc(0, 0), loc(40, 0), loc(20, 40)] {
            assert!(circuit.wires().iter().any(|w| w.ends().contains(&t)), "{t} lost its wire");
        }
    }

    #[test]
    fn minimal_wire_between_terminals_unchanged() {
        let wire = seg(0, 0, 30, 0);
        let mut circuit = circuit_with(&[loc(0, 0), loc(30, 0)], &[wire]);
        let record = Beautify::new().execute(&mut circuit).unwrap();
        assert!(record.is_identity());
        assert_eq!(circuit.wires(), &BTreeSet::from([wire]));
    }

    #[test]
    fn stub_chain_collapses_to_terminal() {
        init_tracing();
        // A 200-step staircase hanging off terminal A, which is also wired to B.
        let live = seg(0, -30, 0, 0);
        let mut wires = vec![live];
        let mut at = loc(0, 0);
        for i in 1..=200 {
            let next = if i % 2 == 1 { loc(at.x + 10, at.y) } else { loc(at.x, at.y + 10) };
            wires.push(Segment::new(at, next).unwrap());
            at = next;
        }
        let mut circuit = circuit_with(&[loc(0, 0), loc(0, -30)], &wires);
        let record = Beautify::new().execute(&mut circuit).unwrap();
        assert_eq!(circuit.wires(), &BTreeSet::from([live]));
        assert_eq!(record.iter().filter(|(_, with)| with.is_empty()).count(), 200);
    }

    #[test]
    fn dead_tree_removed_regardless_of_shape() {
        // Binary-ish tree with no terminal, next to a live wire.
        let live = seg(0, 0, 0, 50);
        let mut wires = vec![live];
        for depth in 0..5 {
            let y = 100 + depth * 10;
            wires.push(seg(100, y, 100, y + 10));
            wires.push(seg(100, y, 90 - depth * 10, y));
            wires.push(seg(100, y, 110 + depth * 10, y));
        }
        let mut circuit = circuit_with(&[loc(0, 0), loc(0, 50)], &wires);
        Beautify::new().execute(&mut circuit).unwrap();
        assert_eq!(circuit.wires(), &BTreeSet::from([live]));
    }

    #[test]
    fn detour_between_terminals_collapses() {
        let mut circuit = circuit_with(
            &[loc(0, 0), loc(10, 0)],
            &[seg(0, 0, 0, 10), seg(0, 10, 10, 10), seg(10, 10, 10, 0)],
        );
        Beautify::new().execute(&mut circuit).unwrap();
        assert_eq!(circuit.wires(), &BTreeSet::from([seg(0, 0, 10, 0)]));
    }

    #[test]
    fn half_c_collapses_to_terminal() {
        // Terminal A at (0,0); detour A-(0,10)-(10,10)-(10,0), then on to a
        // junction at (10,0) feeding two terminals.
        let mut circuit = circuit_with(
            &[loc(0, 0), loc(20, 0), loc(10, -20)],
            &[
                seg(0, 0, 0, 10),
                seg(0, 10, 10, 10),
                seg(10, 10, 10, 0),
                seg(10, 0, 20, 0),
                seg(10, 0, 10, -20),
            ],
        );
        Beautify::new().execute(&mut circuit).unwrap();
        let expected = BTreeSet::from([seg(0, 0, 10, 0), seg(10, 0, 20, 0), seg(10, 0, 10, -20)]);
        assert_eq!(circuit.wires(), &expected);
    }

    #[test]
    fn selection_limits_the_rewrite() {
        let mut circuit = mixed_circuit();
        let cluster = [
            seg(100, 100, 110, 100),
            seg(110, 100, 110, 110),
            seg(110, 100, 120, 100),
        ];
        let record = Beautify::with_wires(cluster).execute(&mut circuit).unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(circuit.wires().len(), 8);
        assert!(circuit.contains_wire(&seg(0, -10, 40, -10)));
    }

    #[test]
    fn stubs_only_leaves_detours() {
        let mut circuit = mixed_circuit();
        let options = BeautifyOptions {
            simplify_detours: false,
            prune_dead_branches: false,
            ..BeautifyOptions::default()
        };
        Beautify::new().options(options).execute(&mut circuit).unwrap();
        assert!(!circuit.contains_wire(&seg(40, 0, 50, 0)));
        assert!(circuit.contains_wire(&seg(0, -10, 40, -10)));
        assert!(circuit.contains_wire(&seg(110, 100, 120, 100)));
    }

    #[test]
    fn run_declares_read_write() {
        assert_eq!(Beautify::new().access(), Access::ReadWrite);
    }

    /// Host whose coordinator rejects every commit.
    struct Contended(Circuit);

    impl NetworkSource for Contended {
        fn segments(&self) -> BTreeSet<Segment> {
            self.0.segments()
        }

        fn terminal_ends(&self) -> Vec<Location> {
            self.0.terminal_ends()
        }
    }

    impl MutationSink for Contended {
        fn replace(&mut self, _record: &ReplacementRecord) -> Result<()> {
            Err(TransactionError::Conflict("circuit locked by another edit".into()).into())
        }
    }

    #[derive(Default)]
    struct CountingRepair(usize);

    impl<N> LocalRepair<N> for CountingRepair {
        fn repair(&mut self, _network: &mut N) -> Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn conflict_aborts_without_changes_or_repair() {
        let mut host = Contended(mixed_circuit());
        let before = host.0.wires().clone();
        let mut repair = CountingRepair::default();
        let err = Beautify::new().execute_with(&mut host, &mut repair).unwrap_err();
        assert!(matches!(err, WireError::Transaction(TransactionError::Conflict(_))));
        assert_eq!(host.0.wires(), &before);
        assert_eq!(repair.0, 0);
    }

    #[test]
    fn repair_runs_once_after_commit() {
        let mut circuit = mixed_circuit();
        let mut repair = CountingRepair::default();
        Beautify::new().execute_with(&mut circuit, &mut repair).unwrap();
        assert_eq!(repair.0, 1);

        let mut empty = Circuit::new();
        let record = Beautify::new().execute_with(&mut empty, &mut repair).unwrap();
        assert!(record.is_empty());
        assert_eq!(repair.0, 2);
    }
}
