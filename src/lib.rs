#![warn(missing_docs)]

//! # `numbersat`
//!
//! A reducer for [Numberlink](https://en.wikipedia.org/wiki/Numberlink)-style number-placement
//! puzzles on rectangular boards. The crate does not solve puzzles itself: it compiles a board
//! into a Boolean formula in conjunctive normal form, delegates to an external satisfiability
//! engine over the DIMACS text protocol, and decodes the engine's model back into a filled
//! grid.
//!
//! Begin by building a [`Board`] with a [`BoardBuilder`](builder::BoardBuilder), then call
//! [`Board::solve_with`] with a [`SolverBackend`](solver::SolverBackend) such as
//! [`ExternalSolver`](solver::ExternalSolver).
//!
//! # Internals
//!
//! The proposition "cell p holds label n" maps bijectively onto a variable identifier through
//! the [`VarCodec`](codec::VarCodec), which packs column, row, and label into fixed-width
//! decimal fields behind a leading `1`. The [`Compiler`](compile::Compiler) then asserts, per
//! cell:
//! 1. a numbered cell keeps its given number;
//! 2. no cell holds two labels, and every cell holds at least one;
//! 3. a numbered cell (a path endpoint) has exactly one identically labeled neighbor, and a
//!    free cell (a path interior) exactly two, via a direct blocking-pattern cardinality
//!    encoding over the at-most-4 grid neighbors.
//!
//! A model satisfying all of the above traces out vertex-disjoint paths connecting each pair
//! of identical numbers while covering the whole board, so reading the one true label off
//! every cell reproduces the solved puzzle.

pub use board::{Board, Label};
pub use builder::BoardBuilder;
pub use grid::SolvedGrid;
pub use location::{Coord, Dimension, Location};

pub(crate) mod location;
pub(crate) mod board;
mod tests;
pub mod builder;
pub mod codec;
pub mod compile;
pub mod dimacs;
pub mod grid;
pub mod logic;
pub mod solver;
