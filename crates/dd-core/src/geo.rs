//! Planar grid coordinates and Euclidean distance.
//!
//! Positions are integer grid cells; distances are `f64` kilometres.  The
//! home base sits at the origin and every route starts and ends there.

/// A point on the integer delivery grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

/// The home base every drone departs from and returns to.
pub const BASE: GridPoint = GridPoint { x: 0, y: 0 };

impl GridPoint {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance_to(self, other: GridPoint) -> f64 {
        distance(self.x, self.y, other.x, other.y)
    }

    #[inline]
    pub fn is_base(self) -> bool {
        self == BASE
    }
}

/// `sqrt((x2-x1)^2 + (y2-y1)^2)`.
///
/// Deltas are taken in `i64` and squared in `f64` so extreme coordinates
/// cannot overflow.
#[inline]
pub fn distance(x1: i32, y1: i32, x2: i32, y2: i32) -> f64 {
    let dx = (i64::from(x2) - i64::from(x1)) as f64;
    let dy = (i64::from(y2) - i64::from(y1)) as f64;
    (dx * dx + dy * dy).sqrt()
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
