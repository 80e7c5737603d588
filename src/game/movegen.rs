use serde::Serialize;
use std::collections::BTreeSet;

use crate::game::attacks::is_attacked;
use crate::game::board::Board;
use crate::game::piece::{Color, Piece, PieceKind, PromotionChoice, KING_STEPS, KNIGHT_DELTAS};
use crate::game::position::Position;

const KING_FILE: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Normal,
    DoubleStep,
    EnPassant,
    CastleKingside,
    CastleQueenside,
    /// The pawn reached the last rank; the caller must pick (or default) a piece.
    Promotion,
}

impl MoveKind {
    /// Rook source and destination files for a castling move.
    fn rook_files(self) -> Option<(usize, usize)> {
        match self {
            MoveKind::CastleKingside => Some((7, 5)),
            MoveKind::CastleQueenside => Some((0, 3)),
            _ => None,
        }
    }
}

/// One applied move, as kept in a game's history.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub from: Position,
    pub to: Position,
    pub piece: PieceKind,
    pub color: Color,
    pub captured: Option<PieceKind>,
    pub kind: MoveKind,
    pub promotion: Option<PieceKind>,
}

/// All destinations the piece on `from` can reach by its movement rules,
/// ignoring whether the move leaves its own king in check.
///
/// An empty square yields an empty set.
pub fn pseudo_legal_moves(board: &Board, from: Position) -> BTreeSet<Position> {
    let Some(piece) = board.get(from) else {
        return BTreeSet::new();
    };

    let mut moves = BTreeSet::new();
    match piece.kind {
        PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop => {
            slide(board, from, piece, &mut moves)
        }
        PieceKind::Knight => step(board, from, piece, &KNIGHT_DELTAS, &mut moves),
        PieceKind::King => {
            step(board, from, piece, &KING_STEPS, &mut moves);
            castle(board, from, piece, &mut moves);
        }
        PieceKind::Pawn => pawn(board, from, piece, &mut moves),
    }
    moves
}

fn is_enemy(board: &Board, position: Position, color: Color) -> bool {
    board.get(position).is_some_and(|other| other.color != color)
}

fn slide(board: &Board, from: Position, piece: Piece, moves: &mut BTreeSet<Position>) {
    for &(d_rank, d_file) in piece.kind.slide_dirs() {
        let mut cur = from.offset(d_rank, d_file);
        while let Some(to) = cur {
            match board.get(to) {
                None => {
                    moves.insert(to);
                }
                Some(other) => {
                    if other.color != piece.color {
                        moves.insert(to);
                    }
                    break;
                }
            }
            cur = to.offset(d_rank, d_file);
        }
    }
}

fn step(
    board: &Board,
    from: Position,
    piece: Piece,
    deltas: &[(isize, isize)],
    moves: &mut BTreeSet<Position>,
) {
    moves.extend(
        deltas
            .iter()
            .filter_map(|&(d_rank, d_file)| from.offset(d_rank, d_file))
            .filter(|to| board.get(*to).map_or(true, |other| other.color != piece.color)),
    );
}

fn pawn(board: &Board, from: Position, piece: Piece, moves: &mut BTreeSet<Position>) {
    let dir = piece.color.pawn_direction();

    if let Some(one) = from.offset(dir, 0).filter(|to| board.get(*to).is_none()) {
        moves.insert(one);
        if from.rank() == piece.color.pawn_rank() {
            if let Some(two) = one.offset(dir, 0).filter(|to| board.get(*to).is_none()) {
                moves.insert(two);
            }
        }
    }

    for d_file in [-1, 1] {
        let Some(to) = from.offset(dir, d_file) else {
            continue;
        };
        if is_enemy(board, to, piece.color) || en_passant_victim(board, from, to, piece).is_some() {
            moves.insert(to);
        }
    }
}

/// The enemy pawn removed when the pawn on `from` captures en passant onto `to`.
fn en_passant_victim(
    board: &Board,
    from: Position,
    to: Position,
    piece: Piece,
) -> Option<Position> {
    if piece.kind != PieceKind::Pawn
        || board.en_passant_target() != Some(to)
        || from.file() == to.file()
    {
        return None;
    }
    let victim = Position::at(from.rank(), to.file());
    board
        .get(victim)
        .filter(|other| other.kind == PieceKind::Pawn && other.color != piece.color)
        .map(|_| victim)
}

fn castle(board: &Board, from: Position, king: Piece, moves: &mut BTreeSet<Position>) {
    let rank = king.color.home_rank();
    if king.has_moved() || from != Position::at(rank, KING_FILE) {
        return;
    }

    let enemy = king.color.opponent();
    if is_attacked(board, from, enemy) {
        return;
    }

    for kind in [MoveKind::CastleKingside, MoveKind::CastleQueenside] {
        let Some((rook_file, _)) = kind.rook_files() else {
            continue;
        };
        let rook_ready = board.get(Position::at(rank, rook_file)).is_some_and(|rook| {
            rook.kind == PieceKind::Rook && rook.color == king.color && !rook.has_moved()
        });
        if !rook_ready {
            continue;
        }

        let (low, high) = if rook_file > KING_FILE {
            (KING_FILE + 1, rook_file)
        } else {
            (rook_file + 1, KING_FILE)
        };
        if (low..high).any(|file| board.get(Position::at(rank, file)).is_some()) {
            continue;
        }

        // The king crosses one square and lands on the next; neither may be attacked.
        let dir: isize = if rook_file > KING_FILE { 1 } else { -1 };
        let path = [from.offset(0, dir), from.offset(0, 2 * dir)];
        if path.iter().flatten().all(|square| !is_attacked(board, *square, enemy)) {
            if let Some(landing) = path[1] {
                moves.insert(landing);
            }
        }
    }
}

/// Classifies the move of the piece on `from` to `to`. `None` if `from` is empty.
pub fn classify(board: &Board, from: Position, to: Position) -> Option<MoveKind> {
    let piece = board.get(from)?;
    let kind = match piece.kind {
        PieceKind::King if from.file().abs_diff(to.file()) == 2 => {
            if to.file() > from.file() {
                MoveKind::CastleKingside
            } else {
                MoveKind::CastleQueenside
            }
        }
        PieceKind::Pawn if to.rank() == piece.color.promotion_rank() => MoveKind::Promotion,
        PieceKind::Pawn if from.rank().abs_diff(to.rank()) == 2 => MoveKind::DoubleStep,
        PieceKind::Pawn if en_passant_victim(board, from, to, piece).is_some() => {
            MoveKind::EnPassant
        }
        _ => MoveKind::Normal,
    };
    Some(kind)
}

/// Whether moving the piece on `from` to `to` needs a promotion choice.
pub fn requires_promotion(board: &Board, from: Position, to: Position) -> bool {
    classify(board, from, to) == Some(MoveKind::Promotion)
}

/// Moves the piece on `from` to `to` without checking legality, handling the
/// en-passant capture, the castling rook and promotion. Returns `None` and
/// leaves the board untouched if `from` is empty.
pub fn apply_move(
    board: &mut Board,
    from: Position,
    to: Position,
    promotion: PromotionChoice,
) -> Option<MoveRecord> {
    let mut piece = board.get(from)?;
    let kind = classify(board, from, to)?;
    let mut captured = board.get(to).map(|other| other.kind);

    board.set(from, None);
    board.set_en_passant_target(None);

    match kind {
        MoveKind::EnPassant => {
            let victim = Position::at(from.rank(), to.file());
            captured = board.get(victim).map(|other| other.kind);
            board.set(victim, None);
        }
        MoveKind::CastleKingside | MoveKind::CastleQueenside => {
            if let Some((rook_from, rook_to)) = kind.rook_files() {
                let rook_from = Position::at(from.rank(), rook_from);
                if let Some(mut rook) = board.get(rook_from) {
                    rook.move_count += 1;
                    board.set(rook_from, None);
                    board.set(Position::at(from.rank(), rook_to), Some(rook));
                }
            }
        }
        MoveKind::DoubleStep => {
            let skipped = Position::at((from.rank() + to.rank()) / 2, from.file());
            board.set_en_passant_target(Some(skipped));
        }
        MoveKind::Promotion | MoveKind::Normal => {}
    }

    let record = MoveRecord {
        from,
        to,
        piece: piece.kind,
        color: piece.color,
        captured,
        kind,
        promotion: (kind == MoveKind::Promotion).then(|| PieceKind::from(promotion)),
    };

    if kind == MoveKind::Promotion {
        piece.kind = promotion.into();
    }
    piece.move_count += 1;
    board.set(to, Some(piece));

    Some(record)
}
