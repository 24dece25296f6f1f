//! Winning line analysis for Tic-Tac-Toe

use std::collections::BTreeSet;

use super::{Player, Token};
use crate::types::{BOARD_SIZE, Position};

/// Winning line indices on the 3x3 board (0-based cells)
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Utility for analyzing winning lines in Tic-Tac-Toe
pub struct LineAnalyzer;

impl LineAnalyzer {
    /// Check if a player has won by having three in a row
    pub fn has_won(cells: &[Token; BOARD_SIZE], player: Player) -> bool {
        let target = player.token();
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| cells[idx] == target))
    }

    /// Positions that would immediately complete a line for the player, ascending
    pub fn winning_moves(cells: &[Token; BOARD_SIZE], player: Player) -> Vec<Position> {
        WINNING_LINES
            .iter()
            .filter_map(|line| Self::winning_move_in_line(cells, player, line))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn winning_move_in_line(
        cells: &[Token; BOARD_SIZE],
        player: Player,
        line: &[usize; 3],
    ) -> Option<Position> {
        let target = player.token();
        let mut count = 0;
        let mut empty = None;

        for &idx in line {
            match cells[idx] {
                Token::Neither => {
                    if empty.is_some() {
                        return None;
                    }
                    empty = Some(idx);
                }
                c if c == target => count += 1,
                _ => return None,
            }
        }

        if count == 2 {
            empty.map(Position::from_index)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(moves: &[Position]) -> Vec<usize> {
        moves.iter().map(|p| p.number()).collect()
    }

    #[test]
    fn test_has_won_vertical() {
        let mut cells = [Token::Neither; 9];
        cells[0] = Token::O;
        cells[3] = Token::O;
        cells[6] = Token::O;

        assert!(LineAnalyzer::has_won(&cells, Player::O));
        assert!(!LineAnalyzer::has_won(&cells, Player::X));
    }

    #[test]
    fn test_has_won_diagonal() {
        let mut cells = [Token::Neither; 9];
        cells[2] = Token::X;
        cells[4] = Token::X;
        cells[6] = Token::X;

        assert!(LineAnalyzer::has_won(&cells, Player::X));
    }

    #[test]
    fn test_winning_moves_multiple() {
        // XX.
        // X..
        // ...
        let mut cells = [Token::Neither; 9];
        cells[0] = Token::X;
        cells[1] = Token::X;
        cells[3] = Token::X;

        let moves = LineAnalyzer::winning_moves(&cells, Player::X);
        assert_eq!(numbers(&moves), vec![3, 7]);
        assert!(LineAnalyzer::winning_moves(&cells, Player::O).is_empty());
    }

    #[test]
    fn test_blocked_line_is_not_a_threat() {
        let mut cells = [Token::Neither; 9];
        cells[0] = Token::X;
        cells[1] = Token::X;
        cells[2] = Token::O;

        assert!(LineAnalyzer::winning_moves(&cells, Player::X).is_empty());
    }
}
