use crate::game::board::Board;
use crate::game::piece::{Color, PieceKind};

#[derive(Default)]
struct Material {
    heavy_or_pawns: usize,
    knights: usize,
    light_bishops: usize,
    dark_bishops: usize,
}

impl Material {
    fn count(board: &Board, color: Color) -> Material {
        let mut material = Material::default();
        for (position, piece) in board.pieces_of(color) {
            match piece.kind {
                PieceKind::King => {}
                PieceKind::Knight => material.knights += 1,
                PieceKind::Bishop if position.is_light() => material.light_bishops += 1,
                PieceKind::Bishop => material.dark_bishops += 1,
                PieceKind::Queen | PieceKind::Rook | PieceKind::Pawn => {
                    material.heavy_or_pawns += 1
                }
            }
        }
        material
    }

    fn minors(&self) -> usize {
        self.knights + self.light_bishops + self.dark_bishops
    }

    fn bare(&self) -> bool {
        self.heavy_or_pawns == 0 && self.minors() == 0
    }

    fn single_minor(&self) -> bool {
        self.heavy_or_pawns == 0 && self.minors() == 1
    }

    fn single_bishop(&self) -> bool {
        self.heavy_or_pawns == 0 && self.knights == 0 && self.light_bishops + self.dark_bishops == 1
    }
}

/// Check if the board has insufficient material for either side to mate.
///
/// Covers king vs king, king and minor piece vs king, and king and bishop vs
/// king and bishop with both bishops on the same square color.
pub fn has_insufficient_material(board: &Board) -> bool {
    let white = Material::count(board, Color::White);
    let black = Material::count(board, Color::Black);

    if white.bare() && black.bare() {
        return true;
    }

    if (white.bare() && black.single_minor()) || (black.bare() && white.single_minor()) {
        return true;
    }

    white.single_bishop()
        && black.single_bishop()
        && white.light_bishops == black.light_bishops
}
