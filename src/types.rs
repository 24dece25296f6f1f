//! Newtype wrappers for improved type safety and domain modeling.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of cells on the board.
pub const BOARD_SIZE: usize = 9;

/// Number of categories shared by tokens and winners (X, O, Neither).
pub const CATEGORIES: usize = 3;

/// A board position, numbered 1-9 row-major from the top-left corner.
///
/// ```text
/// 1 | 2 | 3
/// ---------
/// 4 | 5 | 6
/// ---------
/// 7 | 8 | 9
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Position(u8);

impl Position {
    /// Create a new position from its 1-based number.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPosition`] unless `value` is in 1..=9.
    pub fn new(value: usize) -> Result<Self, crate::Error> {
        if (1..=BOARD_SIZE).contains(&value) {
            Ok(Position(value as u8))
        } else {
            Err(crate::Error::InvalidPosition { position: value })
        }
    }

    /// Position for a 0-based cell index. Callers guarantee `index < 9`.
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < BOARD_SIZE);
        Position(index as u8 + 1)
    }

    /// The 1-based position number.
    pub fn number(self) -> usize {
        self.0 as usize
    }

    /// The 0-based cell index.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// All nine positions in ascending order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).map(Position::from_index)
    }
}

impl TryFrom<usize> for Position {
    type Error = crate::Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Position::new(value)
    }
}

impl From<Position> for usize {
    fn from(pos: Position) -> Self {
        pos.number()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_bounds() {
        assert!(Position::new(0).is_err());
        assert!(Position::new(10).is_err());
        let corner = Position::new(9).unwrap();
        assert_eq!(corner.index(), 8);
        assert_eq!(corner.number(), 9);
    }

    #[test]
    fn all_positions_are_ordered() {
        let numbers: Vec<usize> = Position::all().map(Position::number).collect();
        assert_eq!(numbers, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn position_serializes_as_number() {
        let json = serde_json::to_string(&Position::new(3).unwrap()).unwrap();
        assert_eq!(json, "3");
        assert!(serde_json::from_str::<Position>("12").is_err());
    }
}
