#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Crossword construction as a constraint satisfaction problem. Slots are
//! variables, words are values, and crossing slots must agree on their
//! shared letter.

pub mod consistency;
pub mod domain;
pub mod puzzle;
pub mod render;
pub mod search;
pub mod solver;
pub mod word_bank;

pub use puzzle::{Direction, Puzzle, Slot, SlotId};
pub use solver::{solve, SolveOutcome, SolveReport, Solution, Solver, SolverConfig};
