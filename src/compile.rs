//! Turns board topology and the puzzle's legality rules into clause families.

use itertools::Itertools;
use log::{debug, info};

use crate::board::Board;
use crate::codec::{EncodeError, VarCodec};
use crate::logic::{at_least_one, at_most_one, exactly_k, Clause, Formula};

/// Compiles a [`Board`] into a [`Formula`] satisfiable iff the puzzle has a legal filling:
/// fixed cells keep their number, every cell holds exactly one label, and every cell agrees
/// with a cell-class-dependent count of identically labeled neighbors (1 for a numbered cell,
/// 2 for a free cell).
///
/// The clause families are generated independently and unioned; set semantics on [`Formula`]
/// collapses duplicates across families.
pub struct Compiler<'a> {
    board: &'a Board,
    codec: &'a VarCodec,
}

impl<'a> Compiler<'a> {
    /// A compiler for `board` using `codec` for the fact/variable bijection. The codec must
    /// cover the board's dimensions and label space; [`VarCodec::for_board`] guarantees that.
    pub fn new(board: &'a Board, codec: &'a VarCodec) -> Self {
        Self { board, codec }
    }

    /// Compile all clause families into one deduplicated formula.
    pub fn compile(&self) -> Result<Formula, EncodeError> {
        let mut formula = Formula::new();

        for (name, family) in [
            ("fixed facts", self.fixed_facts()?),
            ("exclusivity", self.exclusivity()?),
            ("coverage", self.coverage()?),
            ("neighbor cardinality", self.neighbor_cardinality()?),
        ] {
            debug!("family \"{}\": {} clauses", name, family.len());
            formula.extend(family);
        }

        info!(
            "compiled {} distinct clauses over {} cells and {} labels",
            formula.len(),
            self.board.all_positions().len(),
            self.codec.label_count(),
        );

        Ok(formula)
    }

    // every fixed cell keeps its given number, as a unit fact
    pub(crate) fn fixed_facts(&self) -> Result<Vec<Clause>, EncodeError> {
        self.board.numbers.iter()
            .map(|(&location, &label)| {
                Ok(Clause::unit(self.codec.encode(location, label)?.positive()))
            })
            .collect()
    }

    // no cell holds two distinct labels, fixed and free cells alike
    pub(crate) fn exclusivity(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();

        for location in self.board.all_positions() {
            let vars = (0..self.codec.label_count())
                .map(|label| self.codec.encode(location, label))
                .try_collect::<_, Vec<_>, _>()?;

            clauses.extend(at_most_one(&vars).into_iter().map(Clause::new));
        }

        Ok(clauses)
    }

    // every cell holds at least one label; exclusivity and the guarded cardinality family
    // alone admit models which leave a free cell entirely unlabeled
    pub(crate) fn coverage(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();

        for location in self.board.all_positions() {
            let vars = (0..self.codec.label_count())
                .map(|label| self.codec.encode(location, label))
                .try_collect::<_, Vec<_>, _>()?;

            clauses.push(Clause::new(at_least_one(&vars)));
        }

        Ok(clauses)
    }

    // a numbered cell is a path endpoint (exactly 1 identically labeled neighbor); a free
    // cell is a path interior (exactly 2)
    pub(crate) fn neighbor_cardinality(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();

        for location in self.board.all_positions() {
            let neighbors = self.board.neighbors_of(location);
            if neighbors.is_empty() {
                // a cell with no neighbors has nothing to count
                continue;
            }

            let target = if self.board.is_fixed(location) { 1 } else { 2 };

            for label in 0..self.codec.label_count() {
                let neighbor_vars = neighbors.iter()
                    .map(|&neighbor| self.codec.encode(neighbor, label))
                    .try_collect::<_, Vec<_>, _>()?;

                // the guard makes each blocking clause bind only when the cell itself holds
                // this label; for every other label the whole family is vacuous
                let guard = self.codec.encode(location, label)?.negative();

                for mut blocking in exactly_k(&neighbor_vars, target) {
                    blocking.push(guard);
                    clauses.push(Clause::new(blocking));
                }
            }
        }

        Ok(clauses)
    }
}
