//! Self-play generation of labelled training games

use rand::{Rng, prelude::IndexedRandom};
use serde::{Deserialize, Serialize};

use super::{Dataset, Game};
use crate::{
    tictactoe::{Board, LineAnalyzer, Player, Winner},
    types::Position,
};

/// How each side picks its moves during generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePolicy {
    /// Uniformly random legal moves.
    #[default]
    Random,
    /// Complete a line when possible, otherwise block the opponent, otherwise random.
    Greedy,
}

fn pick_move<R: Rng>(
    board: &Board,
    player: Player,
    policy: GamePolicy,
    rng: &mut R,
) -> Option<Position> {
    if policy == GamePolicy::Greedy {
        let wins = LineAnalyzer::winning_moves(board.cells(), player);
        if let Some(&pos) = wins.first() {
            return Some(pos);
        }
        let blocks = LineAnalyzer::winning_moves(board.cells(), player.opponent());
        if let Some(&pos) = blocks.first() {
            return Some(pos);
        }
    }
    board.empty_positions().choose(rng).copied()
}

/// Play one game to completion with X moving first.
pub fn play_game<R: Rng>(policy: GamePolicy, rng: &mut R) -> Game {
    let mut board = Board::new();
    let mut to_move = Player::X;
    while board.outcome().is_none() {
        let Some(pos) = pick_move(&board, to_move, policy, rng) else {
            break;
        };
        board.set(pos, to_move.token());
        to_move = to_move.opponent();
    }
    Game::from_board(board.outcome().unwrap_or(Winner::Neither), &board)
}

/// Generate `count` self-play games labelled with their actual outcome.
pub fn generate_games<R: Rng>(count: usize, policy: GamePolicy, rng: &mut R) -> Dataset {
    (0..count).map(|_| play_game(policy, rng)).collect()
}
