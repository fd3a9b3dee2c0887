pub mod location;
pub mod segment;

pub use location::Location;
pub use segment::Segment;
