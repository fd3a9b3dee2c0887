use std::fmt;

/// An integer point on the design grid.
///
/// Ordering is lexicographic by `(x, y)`, which gives segments a canonical
/// endpoint order and keeps every traversal deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns `true` if the two locations lie on a common row or column.
    #[must_use]
    pub fn shares_axis(&self, other: &Location) -> bool {
        self.x == other.x || self.y == other.y
    }
}

impl From<(i32, i32)> for Location {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
