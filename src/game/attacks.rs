use std::collections::BTreeSet;

use crate::game::board::Board;
use crate::game::movegen::{apply_move, pseudo_legal_moves};
use crate::game::piece::{Color, Piece, PieceKind, PromotionChoice};
use crate::game::position::Position;

/// True iff any piece of `by` attacks `target`.
///
/// Pawns attack their forward diagonals whether or not anything stands there,
/// and castling never counts as an attack.
pub fn is_attacked(board: &Board, target: Position, by: Color) -> bool {
    board
        .pieces_of(by)
        .any(|(from, piece)| from != target && piece_attacks(board, piece, from, target))
}

fn piece_attacks(board: &Board, piece: Piece, from: Position, target: Position) -> bool {
    let d_rank = target.rank() as isize - from.rank() as isize;
    let d_file = target.file() as isize - from.file() as isize;

    match piece.kind {
        PieceKind::King => d_rank.abs() <= 1 && d_file.abs() <= 1,
        PieceKind::Knight => matches!((d_rank.abs(), d_file.abs()), (1, 2) | (2, 1)),
        PieceKind::Pawn => d_rank == piece.color.pawn_direction() && d_file.abs() == 1,
        PieceKind::Rook => (d_rank == 0 || d_file == 0) && ray_clear(board, from, target),
        PieceKind::Bishop => d_rank.abs() == d_file.abs() && ray_clear(board, from, target),
        PieceKind::Queen => {
            (d_rank == 0 || d_file == 0 || d_rank.abs() == d_file.abs())
                && ray_clear(board, from, target)
        }
    }
}

/// No piece stands strictly between `from` and `target` on their shared line.
fn ray_clear(board: &Board, from: Position, target: Position) -> bool {
    let step_rank = (target.rank() as isize - from.rank() as isize).signum();
    let step_file = (target.file() as isize - from.file() as isize).signum();

    let mut cur = from.offset(step_rank, step_file);
    while let Some(square) = cur {
        if square == target {
            return true;
        }
        if board.get(square).is_some() {
            return false;
        }
        cur = square.offset(step_rank, step_file);
    }
    false
}

/// Whether `color`'s king is attacked. A board without that king is never in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king_position(color)
        .is_some_and(|king| is_attacked(board, king, color.opponent()))
}

/// Pseudo-legal moves of the piece on `from` that do not leave its own king in check.
pub fn legal_moves(board: &Board, from: Position) -> BTreeSet<Position> {
    let Some(piece) = board.get(from) else {
        return BTreeSet::new();
    };

    pseudo_legal_moves(board, from)
        .into_iter()
        .filter(|to| {
            let mut next = board.clone();
            apply_move(&mut next, from, *to, PromotionChoice::default()).is_some()
                && !is_in_check(&next, piece.color)
        })
        .collect()
}

/// Every legal move available to `color`, grouped by origin square.
pub fn all_legal_moves(board: &Board, color: Color) -> Vec<(Position, BTreeSet<Position>)> {
    board
        .pieces_of(color)
        .map(|(from, _)| (from, legal_moves(board, from)))
        .filter(|(_, moves)| !moves.is_empty())
        .collect()
}

pub fn has_any_legal_move(board: &Board, color: Color) -> bool {
    board
        .pieces_of(color)
        .any(|(from, _)| !legal_moves(board, from).is_empty())
}

pub fn is_checkmate(board: &Board, color: Color) -> bool {
    is_in_check(board, color) && !has_any_legal_move(board, color)
}

pub fn is_stalemate(board: &Board, color: Color) -> bool {
    !is_in_check(board, color) && !has_any_legal_move(board, color)
}
