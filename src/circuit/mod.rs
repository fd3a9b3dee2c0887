pub mod component;
pub mod repair;

pub use component::{ComponentData, ComponentId};
pub use repair::WireRepair;

use std::collections::BTreeSet;

use slotmap::SlotMap;
use tracing::trace;

use crate::error::{CircuitError, Result};
use crate::geometry::{Location, Segment};
use crate::topology::ReplacementRecord;
use crate::transaction::{MutationSink, NetworkSource};

/// In-memory circuit: a wire set plus a store of non-wire components.
///
/// Components are referenced by typed IDs (generational indices) so callers
/// can hold on to them across edits.
#[derive(Debug, Default)]
pub struct Circuit {
    wires: BTreeSet<Segment>,
    components: SlotMap<ComponentId, ComponentData>,
}

impl Circuit {
    /// Creates a new, empty circuit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Wire operations ---

    /// Adds a wire, returning `false` if it was already present.
    pub fn add_wire(&mut self, wire: Segment) -> bool {
        self.wires.insert(wire)
    }

    /// Returns `true` if the wire is present.
    #[must_use]
    pub fn contains_wire(&self, wire: &Segment) -> bool {
        self.wires.contains(wire)
    }

    /// Returns the current wires in canonical order.
    #[must_use]
    pub fn wires(&self) -> &BTreeSet<Segment> {
        &self.wires
    }

    // --- Component operations ---

    /// Inserts a component and returns its ID.
    pub fn add_component(&mut self, data: ComponentData) -> ComponentId {
        self.components.insert(data)
    }

    /// Returns a reference to the component data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn component(&self, id: ComponentId) -> Result<&ComponentData> {
        self.components
            .get(id)
            .ok_or_else(|| CircuitError::EntityNotFound("component".into()).into())
    }

    /// Removes a component and returns its data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<ComponentData> {
        self.components
            .remove(id)
            .ok_or_else(|| CircuitError::EntityNotFound("component".into()).into())
    }
}

impl NetworkSource for Circuit {
    fn segments(&self) -> BTreeSet<Segment> {
        self.wires.clone()
    }

    fn terminal_ends(&self) -> Vec<Location> {
        self.components
            .values()
            .flat_map(|c| c.ends.iter().copied())
            .collect()
    }
}

impl MutationSink for Circuit {
    fn replace(&mut self, record: &ReplacementRecord) -> Result<()> {
        if let Some(missing) = record.originals().find(|w| !self.wires.contains(w)) {
            return Err(CircuitError::UnknownWire(*missing).into());
        }
        for original in record.originals() {
            self.wires.remove(original);
        }
        for (original, with) in record.iter() {
            trace!(%original, replacements = with.len(), "replace wire");
            self.wires.extend(with.iter().copied());
        }
        Ok(())
    }
}
