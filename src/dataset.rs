//! Training data: labelled board states and their JSON wire form.
//!
//! A training set is an ordered list of [`Game`]s, each one observed winner
//! plus the nine observed cell tokens. Records arrive as JSON objects with a
//! `winner` field and fields `t1`..`t9`; every record is validated before it
//! reaches the model so the one-hot encoding always has exactly one winner and
//! one token per position.

pub mod generator;
pub mod record;

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use generator::{GamePolicy, generate_games};
pub use record::RawGame;

use crate::{
    tictactoe::{Board, Token, Winner},
    types::{BOARD_SIZE, Position},
};

/// One observed game: the outcome and the nine tokens on the final board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    winner: Winner,
    tokens: [Token; BOARD_SIZE],
}

impl Game {
    pub fn new(winner: Winner, tokens: [Token; BOARD_SIZE]) -> Self {
        Self { winner, tokens }
    }

    pub fn from_board(winner: Winner, board: &Board) -> Self {
        Self::new(winner, *board.cells())
    }

    pub fn winner(&self) -> Winner {
        self.winner
    }

    pub fn tokens(&self) -> &[Token; BOARD_SIZE] {
        &self.tokens
    }

    pub fn token(&self, pos: Position) -> Token {
        self.tokens[pos.index()]
    }

    pub fn board(&self) -> Board {
        Board::from_cells(self.tokens)
    }
}

/// Ordered, validated collection of training games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    games: Vec<Game>,
}

impl Dataset {
    pub fn new(games: Vec<Game>) -> Self {
        Self { games }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The two hand-entered reference games.
    ///
    /// 1. A draw: `X O X / X O O / O X X`.
    /// 2. O wins down the left column: `O O . / O X X / O X .`.
    pub fn reference() -> Self {
        use Token::{Neither as N, O, X};
        Self::new(vec![
            Game::new(Winner::Neither, [X, O, X, X, O, O, O, X, X]),
            Game::new(Winner::O, [O, O, N, O, X, X, O, X, N]),
        ])
    }

    /// Validate raw records, reporting the first malformed game.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidRecord`] or
    /// [`crate::Error::InvalidPositionCount`] naming the offending game index.
    pub fn from_records(records: &[RawGame]) -> Result<Self, crate::Error> {
        let games = records
            .iter()
            .enumerate()
            .map(|(idx, record)| record.validate(idx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { games })
    }

    /// Parse a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or any record fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        let values: Vec<Value> = serde_json::from_str(json)?;
        Self::from_values(values)
    }

    /// Load a JSON array of records from disk.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or fails validation.
    pub fn from_json_file(path: &Path) -> Result<Self, crate::Error> {
        let file = File::open(path).map_err(|source| crate::Error::Io {
            operation: format!("open training data {}", path.display()),
            source,
        })?;
        let values: Vec<Value> = serde_json::from_reader(BufReader::new(file))?;
        Self::from_values(values)
    }

    /// Validate the elements of a parsed JSON array, in order.
    fn from_values(values: Vec<Value>) -> Result<Self, crate::Error> {
        let games = values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| RawGame::from_value(idx, value)?.validate(idx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { games })
    }

    /// Write the games as a pretty-printed JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails.
    pub fn to_json_writer<W: std::io::Write>(&self, writer: W) -> Result<(), crate::Error> {
        let records: Vec<RawGame> = self.games.iter().map(RawGame::from).collect();
        serde_json::to_writer_pretty(writer, &records)?;
        Ok(())
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Game> {
        self.games.iter()
    }
}

impl FromIterator<Game> for Dataset {
    fn from_iter<I: IntoIterator<Item = Game>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_games_match_their_outcomes() {
        let dataset = Dataset::reference();
        assert_eq!(dataset.len(), 2);
        for game in dataset.iter() {
            assert_eq!(game.board().outcome(), Some(game.winner()));
        }
    }

    #[test]
    fn json_round_trip_preserves_games() {
        let dataset = Dataset::reference();
        let mut buffer = Vec::new();
        dataset.to_json_writer(&mut buffer).unwrap();
        let parsed = Dataset::from_json_str(std::str::from_utf8(&buffer).unwrap()).unwrap();
        assert_eq!(parsed, dataset);
    }

    #[test]
    fn malformed_record_reports_game_index() {
        let json = r#"[
            {"winner": "X", "t1": "X", "t2": "X", "t3": "X", "t4": "O", "t5": "O",
             "t6": "Neither", "t7": "Neither", "t8": "Neither", "t9": "Neither"},
            {"winner": "Y", "t1": "X", "t2": "X", "t3": "X", "t4": "O", "t5": "O",
             "t6": "Neither", "t7": "Neither", "t8": "Neither", "t9": "Neither"}
        ]"#;
        let err = Dataset::from_json_str(json).unwrap_err();
        match err {
            crate::Error::InvalidRecord { game, field, value } => {
                assert_eq!(game, 1);
                assert_eq!(field, "winner");
                assert_eq!(value, "Y");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
