use thiserror::Error;

use crate::geometry::{Location, Segment};

/// Top-level error type for wire network operations.
#[derive(Debug, Error)]
pub enum WireError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Circuit(#[from] CircuitError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// Errors raised when constructing grid geometry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("degenerate segment: both endpoints at {0}")]
    Degenerate(Location),

    #[error("segment {start} -> {end} is not axis-aligned")]
    NotAxisAligned { start: Location, end: Location },
}

/// Errors related to the host circuit model.
#[derive(Debug, Error)]
pub enum CircuitError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("wire {0} is not part of the circuit")]
    UnknownWire(Segment),
}

/// Errors reported by the transaction coordinator around a run.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("conflicting access to circuit: {0}")]
    Conflict(String),
}

/// Convenience type alias for results using [`WireError`].
pub type Result<T> = std::result::Result<T, WireError>;
