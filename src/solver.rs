//! The seam in front of the external satisfiability engine, and the end-to-end
//! reduce/solve/decode pipeline.

use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::board::Board;
use crate::codec::{CodecError, EncodeError, VarCodec};
use crate::compile::Compiler;
use crate::dimacs;
use crate::grid::{decode_model, SolvedGrid};
use crate::location::Location;

/// Exit status conventions of the picosat/minisat lineage.
const EXIT_SAT: i32 = 10;
const EXIT_UNSAT: i32 = 20;

/// What the engine concluded about a formula.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SolverVerdict {
    /// A satisfying assignment exists; the model follows on the output.
    Satisfiable,
    /// No satisfying assignment exists.
    Unsatisfiable,
}

/// One finished engine run: the verdict plus the raw standard output it printed.
#[derive(Clone, Debug)]
pub struct SolverOutput {
    /// The verdict, mapped from the exit status before any output parsing.
    pub verdict: SolverVerdict,
    /// Everything the engine printed on standard output.
    pub stdout: String,
}

/// Reasons an engine run may fail. Unsatisfiability is not a failure; see
/// [`SolverVerdict::Unsatisfiable`].
#[derive(Debug)]
pub enum SolverFailure {
    /// The engine process could not be launched or communicated with.
    Io(io::Error),
    /// The engine exited with a status denoting neither verdict (`None` when killed by a
    /// signal).
    AbnormalExit(Option<i32>),
}

impl Display for SolverFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "could not run the solver process: {}", e),
            Self::AbnormalExit(Some(code)) => write!(f, "solver exited with unrecognized status {}", code),
            Self::AbnormalExit(None) => write!(f, "solver was terminated by a signal"),
        }
    }
}

impl std::error::Error for SolverFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::AbnormalExit(_) => None,
        }
    }
}

/// The narrow synchronous seam in front of the external satisfiability engine.
///
/// Production code uses [`ExternalSolver`]; tests substitute a stub returning canned output,
/// so nothing in the reduction pipeline ever needs a real process to be exercised.
pub trait SolverBackend {
    /// Run the engine on the formula file at `formula_path`, blocking until it finishes, and
    /// map its exit status to a verdict.
    fn run(&self, formula_path: &Path) -> Result<SolverOutput, SolverFailure>;
}

/// Invokes a DIMACS-speaking engine as an external process.
///
/// The engine is assumed correct and deterministic for a given formula. No timeout is imposed
/// here; a caller wanting one owns that decision and must treat it as distinct from
/// unsatisfiability.
pub struct ExternalSolver {
    program: PathBuf,
    verbosity: u32,
}

impl ExternalSolver {
    /// An invoker for the engine binary at `program`, at verbosity 0.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), verbosity: 0 }
    }

    /// Set the verbosity passed to the engine; each level repeats its `-v` flag once.
    pub fn verbosity(mut self, verbosity: u32) -> Self {
        self.verbosity = verbosity;
        self
    }
}

impl SolverBackend for ExternalSolver {
    fn run(&self, formula_path: &Path) -> Result<SolverOutput, SolverFailure> {
        let mut command = Command::new(&self.program);
        for _ in 0..self.verbosity {
            command.arg("-v");
        }
        command.arg(formula_path);

        debug!("invoking {:?}", command);
        let output = command.output().map_err(SolverFailure::Io)?;

        let verdict = match output.status.code() {
            Some(EXIT_SAT) => SolverVerdict::Satisfiable,
            Some(EXIT_UNSAT) => SolverVerdict::Unsatisfiable,
            code => return Err(SolverFailure::AbnormalExit(code)),
        };
        info!("solver verdict: {:?}", verdict);

        Ok(SolverOutput {
            verdict,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Everything that can go wrong between a [`Board`] and its solved grid.
#[derive(Debug)]
pub enum SolveError {
    /// The codec could not be sized for the board (fatal before compilation).
    Codec(CodecError),
    /// A fact outside the codec's domain was encoded; a programmer error in practice, since
    /// the compiler only visits in-bounds cells and in-range labels.
    Encode(EncodeError),
    /// The formula file could not be written.
    Io(io::Error),
    /// The engine run itself failed.
    Solver(SolverFailure),
    /// The engine reported that no solution exists. An expected outcome, not a crash; no grid
    /// is produced.
    Unsatisfiable,
    /// The model asserted two different labels for one cell, which the exclusivity family
    /// should have made impossible.
    ModelConflict {
        /// The doubly-labeled cell.
        location: Location,
    },
    /// A satisfiable verdict left cells unresolved, indicating a modeling or decoding defect.
    /// Never silently rendered as blanks.
    IncompleteModel {
        /// The unresolved cells.
        missing: Vec<Location>,
    },
}

impl Display for SolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "codec construction failed: {}", e),
            Self::Encode(e) => write!(f, "fact encoding failed: {}", e),
            Self::Io(e) => write!(f, "could not write the formula file: {}", e),
            Self::Solver(e) => write!(f, "{}", e),
            Self::Unsatisfiable => write!(f, "the puzzle instance is unsatisfiable"),
            Self::ModelConflict { location } => {
                write!(f, "model asserts two labels for cell {:?}", location)
            }
            Self::IncompleteModel { missing } => {
                write!(f, "model left {} cell(s) unresolved, first {:?}", missing.len(), missing.first())
            }
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Solver(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CodecError> for SolveError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<EncodeError> for SolveError {
    fn from(value: EncodeError) -> Self {
        Self::Encode(value)
    }
}

impl From<io::Error> for SolveError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SolverFailure> for SolveError {
    fn from(value: SolverFailure) -> Self {
        Self::Solver(value)
    }
}

/// Run the whole pipeline: size a codec for `board`, compile its constraints, serialize the
/// formula to `formula_path`, hand that file to `backend`, and decode the model into a grid.
///
/// Data flows strictly forward; nothing is retried. An unsatisfiable verdict surfaces as
/// [`SolveError::Unsatisfiable`] before any model parsing is attempted.
pub fn solve_with<B: SolverBackend>(
    board: &Board,
    backend: &B,
    formula_path: &Path,
) -> Result<SolvedGrid, SolveError> {
    let codec = VarCodec::for_board(board)?;
    let formula = Compiler::new(board, &codec).compile()?;

    fs::write(formula_path, dimacs::render(&formula))?;

    let output = backend.run(formula_path)?;
    match output.verdict {
        SolverVerdict::Unsatisfiable => Err(SolveError::Unsatisfiable),
        SolverVerdict::Satisfiable => {
            let model = dimacs::parse_model(&output.stdout);
            decode_model(&model, board, &codec)
        }
    }
}
