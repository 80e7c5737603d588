pub mod attacks;
pub mod board;
pub mod movegen;
pub mod piece;
pub mod position;
pub mod utils;

pub use attacks::{is_attacked, is_checkmate, is_in_check, is_stalemate, legal_moves};
pub use board::Board;
pub use movegen::{apply_move, pseudo_legal_moves, MoveKind, MoveRecord};
pub use piece::{Color, Piece, PieceKind, PromotionChoice};
pub use position::Position;
