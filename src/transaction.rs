//! Contracts between a wire operation and the host that owns the circuit.
//!
//! The host's transaction coordinator reads [`Access`] declarations to
//! serialize runs touching the same circuit. Locking and retry policy stay on
//! the host side.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::geometry::{Location, Segment};
use crate::topology::ReplacementRecord;

/// Access an operation needs to a circuit for its whole duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadWrite,
}

/// Supplies the current wiring and terminal locations of a circuit.
pub trait NetworkSource {
    /// Current wire segments.
    fn segments(&self) -> BTreeSet<Segment>;

    /// Connection points of every non-wire component.
    fn terminal_ends(&self) -> Vec<Location>;
}

/// Applies a replacement record to a circuit in one atomic step.
pub trait MutationSink {
    /// Applies every entry of `record` or none of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be applied; the circuit is then
    /// left unchanged.
    fn replace(&mut self, record: &ReplacementRecord) -> Result<()>;
}

/// Post-commit pass that restores per-point wiring invariants.
pub trait LocalRepair<N: ?Sized> {
    /// Runs the repair synchronously on the circuit.
    ///
    /// # Errors
    ///
    /// Returns an error if the repair's own commit fails.
    fn repair(&mut self, network: &mut N) -> Result<()>;
}

/// Repair pass that leaves the circuit untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRepair;

impl<N: ?Sized> LocalRepair<N> for NoRepair {
    fn repair(&mut self, _network: &mut N) -> Result<()> {
        Ok(())
    }
}
