//! Pure game rules.

pub mod board;

pub use board::{Board, BoardError, Cell, Evaluation, Role};
