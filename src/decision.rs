//! Move selection by posterior probability of winning.
//!
//! Each empty cell is scored by filling it with the mover's token and
//! computing, for each winner `w`,
//!
//! ```text
//! joint(w) = P(W = w) * prod_p P(T_p | W = w)
//! ```
//!
//! over all nine cells, with still-empty cells scored as `Neither` tokens.
//! The score of the move is `joint(player) / sum_w joint(w)`.

use serde::Serialize;

use crate::{
    estimator::Posterior,
    params::SimplexParams,
    tictactoe::{Board, Category, Player, Token, Winner},
    types::{CATEGORIES, Position},
};

/// Which point estimate (or average) of the parameters scores the moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EstimateSource {
    /// The MAP point; deterministic for a given training set
    Map,
    /// Mean of the retained draws
    #[default]
    PosteriorMean,
    /// Average of the per-draw joints over the retained draws
    Predictive,
}

/// Score of a single candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveScore {
    pub position: Position,
    /// Un-normalised joint per winner, indexed by [`Winner::index`]
    pub joints: [f64; CATEGORIES],
    /// Sum of `joints`
    pub normalizer: f64,
    /// Posterior probability that the mover wins; zero when `normalizer` is zero
    pub score: f64,
}

impl MoveScore {
    fn new(position: Position, joints: [f64; CATEGORIES], player: Player) -> Self {
        let normalizer: f64 = joints.iter().sum();
        let score = if normalizer > 0.0 {
            joints[player.as_winner().index()] / normalizer
        } else {
            0.0
        };
        Self {
            position,
            joints,
            normalizer,
            score,
        }
    }

    /// Normalised probability of each winner.
    pub fn winner_probability(&self, winner: Winner) -> f64 {
        if self.normalizer > 0.0 {
            self.joints[winner.index()] / self.normalizer
        } else {
            0.0
        }
    }
}

/// The chosen move plus the scores of every legal move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveDecision {
    pub player: Player,
    pub source: EstimateSource,
    pub position: Position,
    pub scores: Vec<MoveScore>,
}

/// Un-normalised joint `P(W = w) * P(board | W = w)` for every winner.
///
/// Cells are exchangeable given the winner, so the product is taken over
/// token counts; boards with the same counts give bit-identical joints.
pub fn winner_joints(params: &SimplexParams, board: &Board) -> [f64; CATEGORIES] {
    let mut counts = [0i32; CATEGORIES];
    for &token in board.cells() {
        counts[token.index()] += 1;
    }
    Winner::ALL.map(|winner| {
        Token::ALL
            .iter()
            .fold(params.winner_probability(winner), |acc, &token| {
                acc * params.token_probability(winner, token).powi(counts[token.index()])
            })
    })
}

fn candidates(board: &Board, player: Player) -> Result<Vec<(Position, Board)>, crate::Error> {
    let empty = board.empty_positions();
    if empty.is_empty() {
        return Err(crate::Error::NoLegalMove);
    }
    empty
        .into_iter()
        .map(|pos| Ok((pos, board.place(pos, player.token())?)))
        .collect()
}

/// Score every legal move with a single parameter point.
///
/// # Errors
///
/// Returns [`crate::Error::NoLegalMove`] if the board is full.
pub fn score_moves(
    params: &SimplexParams,
    board: &Board,
    player: Player,
) -> Result<Vec<MoveScore>, crate::Error> {
    Ok(candidates(board, player)?
        .into_iter()
        .map(|(pos, next)| MoveScore::new(pos, winner_joints(params, &next), player))
        .collect())
}

/// Score every legal move by averaging the joints over posterior draws.
///
/// # Errors
///
/// Returns [`crate::Error::NoLegalMove`] if the board is full, or
/// [`crate::Error::EmptyPosterior`] if `samples` is empty.
pub fn score_moves_predictive(
    samples: &[SimplexParams],
    board: &Board,
    player: Player,
) -> Result<Vec<MoveScore>, crate::Error> {
    if samples.is_empty() {
        return Err(crate::Error::EmptyPosterior);
    }
    let n = samples.len() as f64;
    Ok(candidates(board, player)?
        .into_iter()
        .map(|(pos, next)| {
            let mut joints = [0.0; CATEGORIES];
            for sample in samples {
                for (acc, j) in joints.iter_mut().zip(winner_joints(sample, &next)) {
                    *acc += j / n;
                }
            }
            MoveScore::new(pos, joints, player)
        })
        .collect())
}

/// Highest-scoring move; ties go to the lowest position.
pub fn best_move(scores: &[MoveScore]) -> Option<Position> {
    scores
        .iter()
        .fold(None::<&MoveScore>, |best, candidate| match best {
            Some(b) if b.score > candidate.score => Some(b),
            Some(b) if b.score == candidate.score && b.position < candidate.position => Some(b),
            _ => Some(candidate),
        })
        .map(|s| s.position)
}

/// Choose a move for `player` on `board` using the given estimate.
///
/// # Errors
///
/// Returns [`crate::Error::NoLegalMove`] if the board is full.
pub fn decide(
    posterior: &Posterior,
    board: &Board,
    player: Player,
    source: EstimateSource,
) -> Result<MoveDecision, crate::Error> {
    let scores = match source {
        EstimateSource::Map => score_moves(&posterior.map().params, board, player)?,
        EstimateSource::PosteriorMean => score_moves(&posterior.mean(), board, player)?,
        EstimateSource::Predictive => score_moves_predictive(posterior.samples(), board, player)?,
    };
    let position = best_move(&scores).ok_or(crate::Error::NoLegalMove)?;
    Ok(MoveDecision {
        player,
        source,
        position,
        scores,
    })
}
