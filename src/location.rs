use ndarray::Ix;
use strum::VariantArray;

/// One coordinate of a cell location.
pub type Coord = usize;
/// One board dimension; boards are never zero-sized.
pub type Dimension = std::num::NonZero<Coord>;

/// A cell location on a rectangular board, 0-indexed.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
// x, y
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.1, self.0)
    }

    /// Offset this location by the signed amounts in `rhs`, specified in `(x, y)` order.
    ///
    /// Underflow wraps; the resulting location then fails any bounds check, which is exactly
    /// what stepping off the board should do.
    pub fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.1, value.0)
    }
}

/// The four unit steps on a rectangular board.
///
/// Neighbor enumeration follows variant declaration order, so adjacency queries are
/// deterministic: left, right, down, up.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub(crate) enum Step {
    Left,
    Right,
    Down,
    Up,
}

impl Step {
    /// Attempt the step from `location` in the direction specified by `self` and return the
    /// resultant [`Location`], which may be out of bounds.
    pub(crate) fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
            Self::Down => location.offset_by((0, 1)),
            Self::Up => location.offset_by((0, -1)),
        }
    }
}
