//! The DIMACS-CNF-like boundary format: rendering a [`Formula`] for the external engine and
//! parsing back what the engine prints.
//!
//! Only the pieces the reduction actually exchanges are implemented: the `p cnf` header,
//! clause lines with a `0` terminator, and the `v`-marked model lines. Full CNF parsing is the
//! engine's side of the boundary, not ours.

use std::fmt::{Display, Formatter};
use std::fmt::Write;

use itertools::Itertools;
use log::trace;

use crate::logic::{Formula, Var};

/// Marker token on solver output lines carrying model literals.
const VALUE_MARKER: &str = "v";

/// Reasons the header of a formula file cannot be read back.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HeaderError {
    /// No `p cnf` line was found.
    Missing,
    /// A `p cnf` line was found but its counts did not parse.
    Malformed,
}

impl Display for HeaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "no \"p cnf\" header line present"),
            Self::Malformed => write!(f, "\"p cnf\" header counts did not parse"),
        }
    }
}

impl std::error::Error for HeaderError {}

/// Render `formula` in the boundary text format.
///
/// The header declares the highest variable magnitude in use and the distinct clause count;
/// both match the emitted content exactly. Variables are written as-is, never renumbered, and
/// clauses appear in the formula's canonical order.
pub fn render(formula: &Formula) -> String {
    let declared_vars = formula.max_var().map_or(0, Var::magnitude);

    let mut out = String::new();
    // infallible; String's fmt::Write never errors
    let _ = writeln!(out, "p cnf {} {}", declared_vars, formula.len());
    for clause in formula.iter() {
        let _ = writeln!(out, "{} 0", clause.lits().iter().map(|lit| lit.to_dimacs()).join(" "));
    }

    out
}

/// Parse the declared `(variable count, clause count)` out of a formula file's header.
pub fn parse_header(text: &str) -> Result<(u64, usize), HeaderError> {
    let header = text.lines()
        .find(|line| line.split_whitespace().next() == Some("p"))
        .ok_or(HeaderError::Missing)?;

    match header.split_whitespace().collect_vec().as_slice() {
        ["p", "cnf", vars, clauses] => {
            let vars = vars.parse().map_err(|_| HeaderError::Malformed)?;
            let clauses = clauses.parse().map_err(|_| HeaderError::Malformed)?;
            Ok((vars, clauses))
        }
        _ => Err(HeaderError::Malformed),
    }
}

/// Collect the true variables of the model printed on `output`.
///
/// Only lines whose first token is the value marker `v` are consulted; the literals on every
/// such line accumulate into one model. Negative literals and the terminating `0` are
/// discarded, since only true propositions matter for decoding. Output with no marker lines
/// yields an empty model, not an error.
pub fn parse_model(output: &str) -> Vec<Var> {
    let mut model = Vec::new();

    for line in output.lines() {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(VALUE_MARKER) {
            continue;
        }

        model.extend(
            tokens
                .filter_map(|token| token.parse::<i64>().ok())
                .filter(|&literal| literal > 0)
                .map(|literal| Var::new(literal as u64)),
        );
    }

    trace!("parsed model with {} true variables", model.len());
    model
}
