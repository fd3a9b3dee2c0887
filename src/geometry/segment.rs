use std::fmt;

use crate::error::GeometryError;

use super::location::Location;

/// An axis-aligned wire between two distinct grid locations.
///
/// Endpoints are stored in canonical order (`start < end`), so a segment
/// built from `(a, b)` is equal to one built from `(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment {
    start: Location,
    end: Location,
}

impl Segment {
    /// Creates a segment between two locations.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if both endpoints coincide, or
    /// `GeometryError::NotAxisAligned` if they share neither row nor column.
    pub fn new(a: Location, b: Location) -> Result<Self, GeometryError> {
        if a == b {
            return Err(GeometryError::Degenerate(a));
        }
        if !a.shares_axis(&b) {
            return Err(GeometryError::NotAxisAligned { start: a, end: b });
        }
        let (start, end) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { start, end })
    }

    /// Returns the lower endpoint.
    #[must_use]
    pub fn start(&self) -> Location {
        self.start
    }

    /// Returns the upper endpoint.
    #[must_use]
    pub fn end(&self) -> Location {
        self.end
    }

    /// Returns both endpoints in canonical order.
    #[must_use]
    pub fn ends(&self) -> [Location; 2] {
        [self.start, self.end]
    }

    /// Returns the endpoint opposite to `loc`.
    ///
    /// If `loc` is not an endpoint, the start is returned.
    #[must_use]
    pub fn other_end(&self, loc: Location) -> Location {
        if loc == self.start {
            self.end
        } else {
            self.start
        }
    }

    /// Returns `true` if both endpoints share a y coordinate.
    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    /// Returns `true` if both endpoints share an x coordinate.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    /// Returns `true` if `loc` lies on the segment, endpoints included.
    #[must_use]
    pub fn contains(&self, loc: Location) -> bool {
        if self.is_horizontal() {
            loc.y == self.start.y && (self.start.x..=self.end.x).contains(&loc.x)
        } else {
            loc.x == self.start.x && (self.start.y..=self.end.y).contains(&loc.y)
        }
    }

    /// Returns `true` if `loc` lies strictly between the endpoints.
    #[must_use]
    pub fn contains_interior(&self, loc: Location) -> bool {
        loc != self.start && loc != self.end && self.contains(loc)
    }

    /// Returns `true` if the segments are collinear and share a stretch of
    /// positive length.
    ///
    /// Touching at a single endpoint or crossing perpendicularly is not an
    /// overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Segment) -> bool {
        if self.is_horizontal() && other.is_horizontal() {
            self.start.y == other.start.y
                && self.start.x.max(other.start.x) < self.end.x.min(other.end.x)
        } else if self.is_vertical() && other.is_vertical() {
            self.start.x == other.start.x
                && self.start.y.max(other.start.y) < self.end.y.min(other.end.y)
        } else {
            false
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
