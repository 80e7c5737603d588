use crate::game::piece::Color;
use crate::game::position::Position;
use crate::models::game_state::{GameId, GameStatus};

/// Everything the engine can refuse. Each variant is checked before any
/// state changes, except `KingMissing`, which signals a defect in the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid coordinate ({rank}, {file}): rank and file must be within 0..=7")]
    InvalidCoordinate { rank: i64, file: i64 },

    #[error("invalid square notation: {0}")]
    InvalidNotation(String),

    #[error("no piece found at {0}")]
    NoPieceAtSource(Position),

    #[error("cannot move out of turn: it is {expected}'s move")]
    NotYourTurn { expected: Color },

    #[error("illegal move: {from} -> {to}")]
    IllegalMove { from: Position, to: Position },

    #[error("no game found for id {0}")]
    GameNotFound(GameId),

    #[error("invalid game id: {0}")]
    InvalidGameId(String),

    #[error("game is already over: {0}")]
    GameAlreadyTerminal(GameStatus),

    #[error("internal error: the {0} king is missing from the board")]
    KingMissing(Color),
}

impl GameError {
    /// Stable machine-readable name, sent to clients alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::InvalidCoordinate { .. } => "invalid_coordinate",
            GameError::InvalidNotation(_) => "invalid_notation",
            GameError::NoPieceAtSource(_) => "no_piece_at_source",
            GameError::NotYourTurn { .. } => "not_your_turn",
            GameError::IllegalMove { .. } => "illegal_move",
            GameError::GameNotFound(_) => "game_not_found",
            GameError::InvalidGameId(_) => "invalid_game_id",
            GameError::GameAlreadyTerminal(_) => "game_already_terminal",
            GameError::KingMissing(_) => "internal",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, GameError::KingMissing(_))
    }
}
