//! Board state representation and basic operations

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lines::LineAnalyzer;
use crate::types::{BOARD_SIZE, CATEGORIES, Position};

/// A categorical variable over the three symbols X, O and Neither.
///
/// Tokens and winners share the symbol set but are modelled as distinct
/// variables, each with its own distribution.
pub trait Category: Copy + Eq + fmt::Debug + 'static {
    /// Every value in index order.
    const ALL: [Self; CATEGORIES];

    /// Index of this value in a one-hot vector.
    fn index(self) -> usize;

    /// Value for a one-hot index.
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// The content of a board cell. `Neither` marks an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    X,
    O,
    Neither,
}

impl Token {
    pub fn to_char(self) -> char {
        match self {
            Token::X => 'X',
            Token::O => 'O',
            Token::Neither => '.',
        }
    }

    pub fn from_char(c: char) -> Option<Token> {
        match c {
            '.' | '-' | '_' | 'N' | 'n' => Some(Token::Neither),
            'X' | 'x' => Some(Token::X),
            'O' | 'o' | '0' => Some(Token::O),
            _ => None,
        }
    }

    /// Parse a token name as it appears in training records.
    pub fn from_name(name: &str) -> Option<Token> {
        match name.trim().to_ascii_lowercase().as_str() {
            "x" => Some(Token::X),
            "o" => Some(Token::O),
            "neither" | "n" => Some(Token::Neither),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Token::X => "X",
            Token::O => "O",
            Token::Neither => "Neither",
        }
    }
}

impl Category for Token {
    const ALL: [Self; CATEGORIES] = [Token::X, Token::O, Token::Neither];

    fn index(self) -> usize {
        match self {
            Token::X => 0,
            Token::O => 1,
            Token::Neither => 2,
        }
    }
}

/// The outcome of a game. `Neither` covers draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Winner {
    X,
    O,
    Neither,
}

impl Winner {
    /// Parse a winner name as it appears in training records.
    pub fn from_name(name: &str) -> Option<Winner> {
        match name.trim().to_ascii_lowercase().as_str() {
            "x" => Some(Winner::X),
            "o" => Some(Winner::O),
            "neither" | "n" | "draw" => Some(Winner::Neither),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Winner::X => "X",
            Winner::O => "O",
            Winner::Neither => "Neither",
        }
    }
}

impl Category for Winner {
    const ALL: [Self; CATEGORIES] = [Winner::X, Winner::O, Winner::Neither];

    fn index(self) -> usize {
        match self {
            Winner::X => 0,
            Winner::O => 1,
            Winner::Neither => 2,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A player in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// The token this player places on the board
    pub fn token(self) -> Token {
        match self {
            Player::X => Token::X,
            Player::O => Token::O,
        }
    }

    /// The outcome in which this player wins
    pub fn as_winner(self) -> Winner {
        match self {
            Player::X => Winner::X,
            Player::O => Winner::O,
        }
    }

    /// Parse "X" or "O" (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPlayer`] for anything else.
    pub fn parse(value: &str) -> Result<Player, crate::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Player::X),
            "o" => Ok(Player::O),
            _ => Err(crate::Error::InvalidPlayer {
                player: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token().name())
    }
}

/// Nine cells in row-major order. Empty cells hold [`Token::Neither`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [Token; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Board {
            cells: [Token::Neither; BOARD_SIZE],
        }
    }

    pub fn from_cells(cells: [Token; BOARD_SIZE]) -> Self {
        Board { cells }
    }

    /// Create a board from a string such as `"XO. .X. O.."`.
    ///
    /// Whitespace and `|` separators are ignored. Empty cells may be written
    /// as `.`, `-`, `_` or `N`.
    ///
    /// # Errors
    ///
    /// Returns error if the board does not have exactly 9 cells or any
    /// character is not a valid cell representation.
    pub fn from_string(s: &str) -> Result<Self, crate::Error> {
        let chars: Vec<char> = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '|')
            .collect();
        if chars.len() != BOARD_SIZE {
            return Err(crate::Error::InvalidBoardLength {
                expected: BOARD_SIZE,
                got: chars.len(),
                context: s.to_string(),
            });
        }

        let mut cells = [Token::Neither; BOARD_SIZE];
        for (i, &c) in chars.iter().enumerate() {
            cells[i] = Token::from_char(c).ok_or_else(|| crate::Error::InvalidCellCharacter {
                character: c,
                position: i + 1,
                context: s.to_string(),
            })?;
        }
        Ok(Board { cells })
    }

    pub fn cells(&self) -> &[Token; BOARD_SIZE] {
        &self.cells
    }

    pub fn get(&self, pos: Position) -> Token {
        self.cells[pos.index()]
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Token::Neither
    }

    /// Get all empty positions in ascending order
    pub fn empty_positions(&self) -> Vec<Position> {
        Position::all().filter(|&pos| self.is_empty(pos)).collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != Token::Neither)
    }

    /// Place a token on an empty cell and return the new board
    #[must_use = "place returns a new board; the original is unchanged"]
    pub fn place(&self, pos: Position, token: Token) -> Result<Board, crate::Error> {
        if !self.is_empty(pos) {
            return Err(crate::Error::OccupiedPosition {
                position: pos.number(),
            });
        }
        let mut next = *self;
        next.cells[pos.index()] = token;
        Ok(next)
    }

    /// Overwrite a cell in place.
    pub(crate) fn set(&mut self, pos: Position, token: Token) {
        self.cells[pos.index()] = token;
    }

    /// Check if a player has three in a row
    pub fn has_won(&self, player: Player) -> bool {
        LineAnalyzer::has_won(&self.cells, player)
    }

    /// The finished game's outcome, or `None` while play can continue.
    pub fn outcome(&self) -> Option<Winner> {
        if self.has_won(Player::X) {
            Some(Winner::X)
        } else if self.has_won(Player::O) {
            Some(Winner::O)
        } else if self.is_full() {
            Some(Winner::Neither)
        } else {
            None
        }
    }

    /// Compact 9-character encoding, e.g. `XOX.O....`
    pub fn encode(&self) -> String {
        self.cells.iter().map(|cell| cell.to_char()).collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f, "---------")?;
            }
            writeln!(
                f,
                "{} | {} | {}",
                chunk[0].to_char(),
                chunk[1].to_char(),
                chunk[2].to_char()
            )?;
        }
        Ok(())
    }
}
