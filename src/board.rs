use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter};
use std::path::Path;

use itertools::Itertools;
use strum::VariantArray;

use crate::grid::SolvedGrid;
use crate::location::{Dimension, Location, Step};
use crate::solver::{solve_with, SolveError, SolverBackend};

/// A puzzle number as placed on the board. Label `0` is a meaningful value, not an
/// empty-cell sentinel.
pub type Label = usize;

/// A rectangular Numberlink-style board: dimensions plus the fixed (pre-numbered) cells.
///
/// [`Board`]s should be built using a [`BoardBuilder`](crate::builder::BoardBuilder).
/// The board is a read-only input; every query here is a pure function of its contents.
pub struct Board {
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) numbers: HashMap<Location, Label>,
}

impl Board {
    /// Board width in cells.
    pub fn width(&self) -> usize {
        self.dims.0.get()
    }

    /// Board height in cells.
    pub fn height(&self) -> usize {
        self.dims.1.get()
    }

    /// Board dimensions, in `(x, y)` order.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// Whether `location` lies within this board.
    pub fn contains(&self, location: Location) -> bool {
        location.0 < self.width() && location.1 < self.height()
    }

    /// The in-bounds axis neighbors of `location`, in the fixed order left, right, down, up
    /// (skipping any that fall outside the board).
    ///
    /// Adjacency is a pure function of the board dimensions and is recomputed on every call.
    ///
    /// # Panics
    /// If `location` itself is out of bounds.
    pub fn neighbors_of(&self, location: Location) -> Vec<Location> {
        assert!(self.contains(location), "neighbor query for out-of-bounds location {:?}", location);

        Step::VARIANTS.iter()
            .map(|step| step.attempt_from(location))
            .filter(|neighbor| self.contains(*neighbor))
            .collect_vec()
    }

    /// Every location on the board, in row-major order.
    pub fn all_positions(&self) -> Vec<Location> {
        (0..self.height())
            .cartesian_product(0..self.width())
            .map(|(y, x)| Location(x, y))
            .collect_vec()
    }

    /// The locations holding a given number.
    pub fn fixed_positions(&self) -> BTreeSet<Location> {
        self.numbers.keys().copied().collect()
    }

    /// The locations whose number the solver must infer; the complement of
    /// [`fixed_positions`](Self::fixed_positions).
    pub fn free_positions(&self) -> BTreeSet<Location> {
        let fixed = self.fixed_positions();
        self.all_positions().into_iter().filter(|location| !fixed.contains(location)).collect()
    }

    /// The given number at `location`, if any.
    pub fn label_at(&self, location: Location) -> Option<Label> {
        self.numbers.get(&location).copied()
    }

    /// Whether `location` holds a given number.
    pub fn is_fixed(&self, location: Location) -> bool {
        self.numbers.contains_key(&location)
    }

    /// The highest label among the fixed cells, or [`None`] on a board with no numbers.
    pub fn highest_label(&self) -> Option<Label> {
        self.numbers.values().copied().max()
    }

    /// Size of the label space `[0, highest_label]` used in constraint generation.
    pub fn label_count(&self) -> usize {
        self.highest_label().map_or(0, |highest| highest + 1)
    }

    /// Reduce this board to CNF, hand the formula file at `formula_path` to `backend`, and
    /// decode the resulting model into a [`SolvedGrid`].
    ///
    /// Unsatisfiability is reported as [`SolveError::Unsatisfiable`], an expected outcome
    /// distinct from solver failures.
    pub fn solve_with<B: SolverBackend>(
        &self,
        backend: &B,
        formula_path: &Path,
    ) -> Result<SolvedGrid, SolveError> {
        solve_with(self, backend, formula_path)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for y in 0..self.height() {
            let row = (0..self.width())
                .map(|x| match self.label_at(Location(x, y)) {
                    Some(label) => label.to_string(),
                    None => ".".to_string(),
                })
                .join(" ");
            writeln!(f, "{}", row)?;
        }

        Ok(())
    }
}
