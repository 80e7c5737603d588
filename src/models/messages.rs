use actix::Message;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::movegen::MoveRecord;
use crate::game::piece::PromotionChoice;
use crate::game::position::Position;
use crate::models::game_state::{Game, GameId};

/// Message sent from client to server
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClientMessage {
    pub message_type: String,
    pub game_id: Option<String>,

    /// Raw `[rank, file]` pairs; range-checked by `source` and `destination`.
    pub move_from: Option<(i64, i64)>,
    pub move_to: Option<(i64, i64)>,
    pub promote_to: Option<PromotionChoice>,
}

impl ClientMessage {
    pub fn source(&self) -> Result<Option<Position>, GameError> {
        self.move_from.map(Position::try_from).transpose()
    }

    pub fn destination(&self) -> Result<Option<Position>, GameError> {
        self.move_to.map(Position::try_from).transpose()
    }
}

/// Message sent from server to client
#[derive(Serialize, Debug, Clone, Default)]
pub struct ServerMessage {
    pub message_type: String,
    pub game_id: Option<GameId>,
    pub game: Option<Game>,
    pub available_moves: Option<Vec<Position>>,
    pub last_move: Option<MoveRecord>,
    pub error: Option<ErrorBody>,
}

impl ServerMessage {
    /// A message carrying a full game snapshot and its latest move.
    pub fn with_game(message_type: &str, game: Game) -> ServerMessage {
        ServerMessage {
            message_type: message_type.to_string(),
            game_id: Some(game.id()),
            last_move: game.last_move().copied(),
            game: Some(game),
            ..ServerMessage::default()
        }
    }

    pub fn available_moves(game_id: GameId, moves: Vec<Position>) -> ServerMessage {
        ServerMessage {
            message_type: "available_moves".to_string(),
            game_id: Some(game_id),
            available_moves: Some(moves),
            ..ServerMessage::default()
        }
    }

    pub fn error(game_id: Option<GameId>, error: ErrorBody) -> ServerMessage {
        ServerMessage {
            message_type: "error".to_string(),
            game_id,
            error: Some(error),
            ..ServerMessage::default()
        }
    }
}

/// Error payload shared by HTTP responses and WebSocket messages.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: &str, message: impl Into<String>) -> ErrorBody {
        ErrorBody {
            kind: kind.to_string(),
            message: message.into(),
        }
    }
}

impl From<&GameError> for ErrorBody {
    fn from(error: &GameError) -> Self {
        ErrorBody::new(error.kind(), error.to_string())
    }
}

/// Optional query parameters of a move submission.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct MoveQuery {
    pub promotion: Option<PromotionChoice>,
}

#[derive(Serialize, Debug)]
pub struct VersionResponse<'a> {
    pub name: &'a str,
    pub version: &'a str,
}

#[derive(Serialize, Debug)]
pub struct MovesResponse {
    pub from: Position,
    pub moves: Vec<Position>,
}

/// Message type for WebSocket communication
#[derive(Message)]
#[rtype(result = "()")]
pub struct ChessWebSocketMessage(pub String);
