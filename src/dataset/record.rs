//! JSON wire form of a training record

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Game;
use crate::{
    tictactoe::{Token, Winner},
    types::{BOARD_SIZE, Position},
};

/// An unvalidated training record: `{"winner": "O", "t1": "X", ..., "t9": "Neither"}`.
///
/// Every field is kept as a raw JSON value so that a wrongly typed or missing
/// field is reported against its game and field name rather than as a
/// generic deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Value>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

fn invalid(game: usize, field: &str, value: impl Into<String>) -> crate::Error {
    crate::Error::InvalidRecord {
        game,
        field: field.to_string(),
        value: value.into(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Position number for a field named `t<n>`, written without sign or
/// leading zeros.
fn position_field(key: &str) -> Option<usize> {
    let digits = key.strip_prefix('t')?;
    let number: usize = digits.parse().ok()?;
    (number.to_string() == digits).then_some(number)
}

impl RawGame {
    /// Split one element of a training array into its winner and the
    /// remaining fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidRecord`] with field `<record>` if the
    /// element is not a JSON object.
    pub fn from_value(game: usize, value: Value) -> Result<Self, crate::Error> {
        let Value::Object(object) = value else {
            return Err(invalid(game, "<record>", render(&value)));
        };
        let mut fields: BTreeMap<String, Value> = object.into_iter().collect();
        let winner = fields.remove("winner");
        Ok(Self { winner, fields })
    }

    /// Check the record and convert it into a [`Game`].
    ///
    /// `game` is the record's index in its training set and is echoed back in
    /// any error.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidRecord`] if the winner is missing or unknown, a
    ///   token is not one of X/O/Neither, or an unknown field is present.
    /// - [`crate::Error::InvalidPositionCount`] unless exactly `t1`..`t9` are present.
    pub fn validate(&self, game: usize) -> Result<Game, crate::Error> {
        let winner_value = self
            .winner
            .as_ref()
            .ok_or_else(|| invalid(game, "winner", "<missing>"))?;
        let winner = winner_value
            .as_str()
            .and_then(Winner::from_name)
            .ok_or_else(|| invalid(game, "winner", render(winner_value)))?;

        let mut tokens: [Option<Token>; BOARD_SIZE] = [None; BOARD_SIZE];
        let mut positions = 0;
        for (key, value) in &self.fields {
            let Some(number) = position_field(key) else {
                return Err(invalid(game, key, render(value)));
            };
            positions += 1;
            let Ok(pos) = Position::new(number) else {
                continue;
            };
            let token = value
                .as_str()
                .and_then(Token::from_name)
                .ok_or_else(|| invalid(game, key, render(value)))?;
            tokens[pos.index()] = Some(token);
        }

        let filled = tokens.iter().filter(|t| t.is_some()).count();
        if positions != BOARD_SIZE || filled != BOARD_SIZE {
            return Err(crate::Error::InvalidPositionCount {
                game,
                expected: BOARD_SIZE,
                got: positions,
            });
        }

        let mut cells = [Token::Neither; BOARD_SIZE];
        for (cell, token) in cells.iter_mut().zip(tokens) {
            if let Some(token) = token {
                *cell = token;
            }
        }
        Ok(Game::new(winner, cells))
    }
}

impl From<&Game> for RawGame {
    fn from(game: &Game) -> Self {
        let fields = Position::all()
            .map(|pos| {
                (
                    format!("t{}", pos.number()),
                    Value::String(game.token(pos).name().to_string()),
                )
            })
            .collect();
        Self {
            winner: Some(Value::String(game.winner().name().to_string())),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> RawGame {
        serde_json::from_value(value).unwrap()
    }

    fn full_record() -> Value {
        json!({
            "winner": "O",
            "t1": "O", "t2": "O", "t3": "Neither",
            "t4": "O", "t5": "X", "t6": "X",
            "t7": "O", "t8": "X", "t9": "Neither"
        })
    }

    #[test]
    fn valid_record_converts() {
        let game = record(full_record()).validate(0).unwrap();
        assert_eq!(game.winner(), Winner::O);
        assert_eq!(game.token(Position::new(3).unwrap()), Token::Neither);
        assert_eq!(game.token(Position::new(5).unwrap()), Token::X);
    }

    #[test]
    fn missing_position_is_a_count_error() {
        let mut value = full_record();
        value.as_object_mut().unwrap().remove("t7");
        let err = record(value).validate(4).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::InvalidPositionCount {
                game: 4,
                expected: 9,
                got: 8
            }
        ));
    }

    #[test]
    fn surplus_position_is_a_count_error() {
        let mut value = full_record();
        value
            .as_object_mut()
            .unwrap()
            .insert("t10".to_string(), json!("X"));
        let err = record(value).validate(0).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::InvalidPositionCount { got: 10, .. }
        ));
    }

    #[test]
    fn bad_token_names_the_field() {
        let mut value = full_record();
        value
            .as_object_mut()
            .unwrap()
            .insert("t5".to_string(), json!("Z"));
        let err = record(value).validate(2).unwrap_err();
        match err {
            crate::Error::InvalidRecord { game, field, value } => {
                assert_eq!((game, field.as_str(), value.as_str()), (2, "t5", "Z"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_winner_is_rejected() {
        let mut value = full_record();
        value.as_object_mut().unwrap().remove("winner");
        let err = record(value).validate(0).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidRecord { ref field, .. } if field == "winner"));
    }

    #[test]
    fn non_string_winner_names_the_field() {
        let mut value = full_record();
        value
            .as_object_mut()
            .unwrap()
            .insert("winner".to_string(), json!(7));
        let err = RawGame::from_value(3, value).unwrap().validate(3).unwrap_err();
        match err {
            crate::Error::InvalidRecord { game, field, value } => {
                assert_eq!((game, field.as_str(), value.as_str()), (3, "winner", "7"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_object_element_is_rejected() {
        let err = RawGame::from_value(1, json!(42)).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::InvalidRecord { game: 1, ref field, ref value }
                if field == "<record>" && value == "42"
        ));
    }

    #[test]
    fn padded_position_keys_are_unknown_fields() {
        let mut value = full_record();
        let object = value.as_object_mut().unwrap();
        let token = object.remove("t1").unwrap();
        object.insert("t01".to_string(), token);
        let err = record(value).validate(0).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidRecord { ref field, .. } if field == "t01"));
        assert_eq!(position_field("t+1"), None);
        assert_eq!(position_field("t9"), Some(9));
    }
}
