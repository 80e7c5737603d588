use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};

use crate::error::GameError;
use crate::game::piece::{Color, Piece, PieceKind};
use crate::game::position::{Position, BOARD_SIZE};

/// 8x8 grid of pieces. Rank (8-1) then file (A-H).
pub type Grid = [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE];

pub const STANDARD_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: Grid,

    /// Square skipped by a pawn double step on the immediately preceding move.
    en_passant_target: Option<Position>,
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

impl Board {
    pub fn empty() -> Board {
        Board {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
            en_passant_target: None,
        }
    }

    /// The standard starting arrangement, Black on ranks 0-1 and White on ranks 6-7.
    pub fn standard() -> Board {
        #[rustfmt::skip]
        let back_rank = [
            PieceKind::Rook, PieceKind::Knight, PieceKind::Bishop, PieceKind::Queen,
            PieceKind::King, PieceKind::Bishop, PieceKind::Knight, PieceKind::Rook,
        ];

        let mut board = Board::empty();
        for color in Color::ALL {
            for (file, kind) in back_rank.into_iter().enumerate() {
                board.cells[color.home_rank()][file] = Some(Piece::new(kind, color));
                board.cells[color.pawn_rank()][file] = Some(Piece::new(PieceKind::Pawn, color));
            }
        }
        board
    }

    /// Builds a board from the piece-placement field of a FEN record, e.g.
    /// `"4k3/8/8/8/8/8/8/4K3"`. Every piece starts with a move count of zero.
    pub fn from_placement(placement: &str) -> Result<Board, GameError> {
        let invalid = || GameError::InvalidNotation(placement.to_string());
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_SIZE {
            return Err(invalid());
        }

        let mut board = Board::empty();
        for (rank, row) in rows.into_iter().enumerate() {
            let mut file = 0;
            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                let piece = Piece::from_fen_char(c).ok_or_else(invalid)?;
                if file >= BOARD_SIZE {
                    return Err(invalid());
                }
                board.cells[rank][file] = Some(piece);
                file += 1;
            }
            if file != BOARD_SIZE {
                return Err(invalid());
            }
        }
        Ok(board)
    }

    pub fn get(&self, position: Position) -> Option<Piece> {
        self.cells[position.rank()][position.file()]
    }

    pub fn set(&mut self, position: Position, piece: Option<Piece>) {
        self.cells[position.rank()][position.file()] = piece;
    }

    pub fn en_passant_target(&self) -> Option<Position> {
        self.en_passant_target
    }

    pub(crate) fn set_en_passant_target(&mut self, target: Option<Position>) {
        self.en_passant_target = target;
    }

    pub fn rows(&self) -> &Grid {
        &self.cells
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all()
            .filter_map(move |position| self.get(position).map(|piece| (position, piece)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(position, _)| position)
    }

    pub fn placement(&self) -> String {
        let mut out = String::new();
        for (rank, row) in self.cells.iter().enumerate() {
            if rank > 0 {
                out.push('/');
            }
            let mut empty = 0;
            for cell in row {
                match cell {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
        }
        out
    }
}

/// Serialized as the bare grid: 8 ranks of 8 nullable pieces.
impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.cells.serialize(serializer)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (rank, row) in self.cells.iter().enumerate() {
            write!(f, "{} ", BOARD_SIZE - rank)?;
            for cell in row {
                let c = cell.map(|piece| piece.fen_char()).unwrap_or('.');
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
