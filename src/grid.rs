//! Inverting a satisfying assignment back into a populated grid.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use log::debug;
use ndarray::Array2;

use crate::board::{Board, Label};
use crate::codec::{EncodeError, VarCodec};
use crate::location::Location;
use crate::logic::Var;
use crate::solver::SolveError;

/// A fully decoded solution grid: one label per cell.
///
/// Cells are only ever [`None`] transiently during decoding; [`decode_model`] refuses to
/// return a grid with unresolved cells.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SolvedGrid {
    // row-major, indexed (y, x)
    cells: Array2<Option<Label>>,
}

impl SolvedGrid {
    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// The decoded label at `location`, or [`None`] out of bounds.
    pub fn get(&self, location: Location) -> Option<Label> {
        self.cells.get(location.as_index()).copied().flatten()
    }

    /// Re-encode this grid as the set of variables a model asserting exactly this solution
    /// would hold true.
    ///
    /// Pairs with [`Formula::violations`](crate::logic::Formula::violations): auditing a
    /// known-correct solution against a compiled formula pinpoints wrongly emitted clauses.
    pub fn true_vars(&self, codec: &VarCodec) -> Result<HashSet<Var>, EncodeError> {
        self.cells.indexed_iter()
            .filter_map(|(index, &label)| label.map(|label| (Location::from(index), label)))
            .map(|(location, label)| codec.encode(location, label))
            .collect()
    }
}

impl Display for SolvedGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.rows() {
            let line = row.iter()
                .map(|cell| match cell {
                    Some(label) => label.to_string(),
                    None => ".".to_string(),
                })
                .join(" ");
            writeln!(f, "{}", line)?;
        }

        Ok(())
    }
}

/// Invert a satisfying assignment into a populated grid.
///
/// Each true variable decodes to a (cell, label) fact placed on the grid. Magnitudes the
/// codec never issued are skipped with a debug log rather than aborting: an external engine
/// assigns arbitrary polarity to the filler integers below the declared variable count, so
/// such variables are expected in every real model. A cell asserted with two different labels
/// or left unresolved is a defect in the formula or the decode, and is surfaced as an error
/// rather than printed blank.
pub fn decode_model(
    model: &[Var],
    board: &Board,
    codec: &VarCodec,
) -> Result<SolvedGrid, SolveError> {
    let mut cells: Array2<Option<Label>> =
        Array2::from_shape_simple_fn((board.height(), board.width()), || None);

    for &var in model {
        let (location, label) = match codec.decode(var) {
            Ok(fact) => fact,
            Err(e) => {
                debug!("skipping model variable {}: {}", var.magnitude(), e);
                continue;
            }
        };

        // decode validated bounds, so the index is in range
        let cell = &mut cells[location.as_index()];
        match cell {
            Some(existing) if *existing != label => {
                return Err(SolveError::ModelConflict { location });
            }
            _ => *cell = Some(label),
        }
    }

    let missing = cells.indexed_iter()
        .filter(|(_, label)| label.is_none())
        .map(|(index, _)| Location::from(index))
        .collect_vec();
    if !missing.is_empty() {
        return Err(SolveError::IncompleteModel { missing });
    }

    Ok(SolvedGrid { cells })
}
