use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

use crate::error::GameError;
use crate::game::attacks::{has_any_legal_move, is_in_check, legal_moves};
use crate::game::board::Board;
use crate::game::movegen::{apply_move, MoveRecord};
use crate::game::piece::{Color, PromotionChoice};
use crate::game::position::Position;
use crate::game::utils::has_insufficient_material;

pub type GameId = Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameStatus {
    Active,
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Active
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Active => f.write_str("active"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            GameStatus::Stalemate => f.write_str("stalemate"),
            GameStatus::InsufficientMaterial => f.write_str("draw by insufficient material"),
        }
    }
}

/// One game: board, turn order and counters. Only `attempt_move` mutates it.
///
/// Serializes to the snapshot the presentation layer reads.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Game {
    id: GameId,

    board: Board,

    #[serde(with = "ts_milliseconds")]
    created_at: DateTime<Utc>,

    /// The side to move.
    current_move: Color,

    moves_count: usize,

    /// Recomputed from the board after every applied move.
    is_player_in_check: BTreeMap<Color, bool>,

    status: GameStatus,

    history: Vec<MoveRecord>,
}

impl Game {
    /// A fresh game from the standard starting position, White to move.
    pub fn new(id: GameId) -> Game {
        Game {
            id,
            board: Board::standard(),
            created_at: Utc::now(),
            current_move: Color::White,
            moves_count: 0,
            is_player_in_check: Color::ALL.into_iter().map(|color| (color, false)).collect(),
            status: GameStatus::Active,
            history: Vec::new(),
        }
    }

    /// A game resumed from an arbitrary position with `current_move` to play.
    pub fn from_position(id: GameId, board: Board, current_move: Color) -> Result<Game, GameError> {
        let mut game = Game::new(id);
        game.is_player_in_check = check_map(&board)?;
        game.status = evaluate_status(&board, current_move, &game.is_player_in_check);
        game.board = board;
        game.current_move = current_move;
        Ok(game)
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn current_move(&self) -> Color {
        self.current_move
    }

    pub fn moves_count(&self) -> usize {
        self.moves_count
    }

    pub fn is_player_in_check(&self, color: Color) -> bool {
        self.is_player_in_check.get(&color).copied().unwrap_or(false)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    /// Legal destinations of the piece on `from`, empty once the game is over.
    pub fn legal_moves(&self, from: Position) -> BTreeSet<Position> {
        if self.status.is_terminal() {
            return BTreeSet::new();
        }
        legal_moves(&self.board, from)
    }

    /// Validates and applies one move. On error nothing about the game changes.
    pub fn attempt_move(
        &mut self,
        from: Position,
        to: Position,
        promotion: Option<PromotionChoice>,
    ) -> Result<MoveRecord, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameAlreadyTerminal(self.status));
        }

        let piece = self.board.get(from).ok_or(GameError::NoPieceAtSource(from))?;
        if piece.color != self.current_move {
            return Err(GameError::NotYourTurn {
                expected: self.current_move,
            });
        }

        if !legal_moves(&self.board, from).contains(&to) {
            return Err(GameError::IllegalMove { from, to });
        }

        let mut next = self.board.clone();
        let record = apply_move(&mut next, from, to, promotion.unwrap_or_default())
            .ok_or(GameError::NoPieceAtSource(from))?;

        let checks = check_map(&next)?;
        let to_move = self.current_move.opponent();
        let status = evaluate_status(&next, to_move, &checks);

        self.board = next;
        self.moves_count += 1;
        self.current_move = to_move;
        self.is_player_in_check = checks;
        self.status = status;
        self.history.push(record);

        debug!(
            "game {}: {} {} -> {} ({:?}), status {}",
            self.id, record.color, record.from, record.to, record.kind, self.status
        );
        Ok(record)
    }
}

/// Check flags for both colors; both kings must still be on the board.
fn check_map(board: &Board) -> Result<BTreeMap<Color, bool>, GameError> {
    Color::ALL
        .into_iter()
        .map(|color| {
            board
                .king_position(color)
                .ok_or(GameError::KingMissing(color))
                .map(|_| (color, is_in_check(board, color)))
        })
        .collect()
}

fn evaluate_status(board: &Board, to_move: Color, checks: &BTreeMap<Color, bool>) -> GameStatus {
    if !has_any_legal_move(board, to_move) {
        if checks.get(&to_move).copied().unwrap_or(false) {
            GameStatus::Checkmate {
                winner: to_move.opponent(),
            }
        } else {
            GameStatus::Stalemate
        }
    } else if has_insufficient_material(board) {
        GameStatus::InsufficientMaterial
    } else {
        GameStatus::Active
    }
}
