use crate::geometry::Location;

slotmap::new_key_type! {
    /// Unique identifier for a non-wire component in a circuit.
    pub struct ComponentId;
}

/// Data associated with a non-wire component (gate, pin, splitter, ...).
///
/// Only the connection points matter to wire operations: every end is a
/// terminal that wiring must keep reaching.
#[derive(Debug, Clone)]
pub struct ComponentData {
    /// Display name of the component.
    pub name: String,
    /// Grid locations where wires may attach.
    pub ends: Vec<Location>,
}

impl ComponentData {
    /// Creates a component with the given connection points.
    #[must_use]
    pub fn new(name: impl Into<String>, ends: Vec<Location>) -> Self {
        Self {
            name: name.into(),
            ends,
        }
    }

    /// Creates a single-ended component such as an I/O pin.
    #[must_use]
    pub fn pin(name: impl Into<String>, at: Location) -> Self {
        Self::new(name, vec![at])
    }
}
