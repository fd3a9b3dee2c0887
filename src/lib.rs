pub mod circuit;
pub mod error;
pub mod geometry;
pub mod operations;
pub mod topology;
pub mod transaction;

pub use error::{Result, WireError};
