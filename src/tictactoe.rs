//! Tic-Tac-Toe board representation

pub mod board;
pub mod lines;

pub use board::{Board, Category, Player, Token, Winner};
pub use lines::{LineAnalyzer, WINNING_LINES};
