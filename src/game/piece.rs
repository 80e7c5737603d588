use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{self, Display, Formatter, Write};
use std::ops::Not;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    pub fn from_char(name: char) -> Option<PieceKind> {
        match name.to_ascii_uppercase() {
            'K' => Some(PieceKind::King),
            'Q' => Some(PieceKind::Queen),
            'R' => Some(PieceKind::Rook),
            'B' => Some(PieceKind::Bishop),
            'N' => Some(PieceKind::Knight),
            'P' => Some(PieceKind::Pawn),
            _ => None,
        }
    }

    pub fn char(self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
        }
    }

    /// Unit directions for sliding pieces, empty for everything else.
    pub fn slide_dirs(self) -> &'static [(isize, isize)] {
        match self {
            PieceKind::Queen => &QUEEN_DIRS,
            PieceKind::Rook => &QUEEN_DIRS[..4],
            PieceKind::Bishop => &QUEEN_DIRS[4..],
            _ => &[],
        }
    }
}

impl Serialize for PieceKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_char(self.char())
    }
}

/// Rank/file steps. The first four are orthogonal, the last four diagonal.
pub const QUEEN_DIRS: [(isize, isize); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

pub const KING_STEPS: [(isize, isize); 8] = QUEEN_DIRS;

pub const KNIGHT_DELTAS: [(isize, isize); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Ordered Black before White so check maps serialize as `{"B": .., "W": ..}`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::Black, Color::White];

    pub fn from_char(c: char) -> Option<Color> {
        match c.to_ascii_uppercase() {
            'B' => Some(Color::Black),
            'W' => Some(Color::White),
            _ => None,
        }
    }

    pub fn char(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }

    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Rank step of a forward pawn move. White plays up the board toward rank 0.
    pub fn pawn_direction(self) -> isize {
        match self {
            Color::Black => 1,
            Color::White => -1,
        }
    }

    pub fn home_rank(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 7,
        }
    }

    pub fn pawn_rank(self) -> usize {
        match self {
            Color::Black => 1,
            Color::White => 6,
        }
    }

    pub fn promotion_rank(self) -> usize {
        self.opponent().home_rank()
    }
}

impl Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        self.opponent()
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => f.write_str("black"),
            Color::White => f.write_str("white"),
        }
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_char(self.char())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Piece {
    pub kind: PieceKind,

    /// The owner of the piece.
    pub color: Color,

    /// How many times this piece has moved. Never decreases.
    pub move_count: u32,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Piece {
        Piece {
            kind,
            color,
            move_count: 0,
        }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = PieceKind::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(kind, color))
    }

    pub fn fen_char(&self) -> char {
        match self.color {
            Color::White => self.kind.char(),
            Color::Black => self.kind.char().to_ascii_lowercase(),
        }
    }

    pub fn has_moved(&self) -> bool {
        self.move_count > 0
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_char(self.color.char())?;
        f.write_char(self.kind.char())
    }
}

/// Piece a pawn becomes on the last rank. Accepts `"Q"` or `"queen"` style input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromotionChoice {
    #[default]
    #[serde(rename = "Q", alias = "q", alias = "queen")]
    Queen,
    #[serde(rename = "R", alias = "r", alias = "rook")]
    Rook,
    #[serde(rename = "B", alias = "b", alias = "bishop")]
    Bishop,
    #[serde(rename = "N", alias = "n", alias = "knight")]
    Knight,
}

impl From<PromotionChoice> for PieceKind {
    fn from(choice: PromotionChoice) -> PieceKind {
        match choice {
            PromotionChoice::Queen => PieceKind::Queen,
            PromotionChoice::Rook => PieceKind::Rook,
            PromotionChoice::Bishop => PieceKind::Bishop,
            PromotionChoice::Knight => PieceKind::Knight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_toggle() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(Color::Black.opponent(), Color::White);
        assert_eq!(Color::White.promotion_rank(), 0);
        assert_eq!(Color::Black.promotion_rank(), 7);
    }

    #[test]
    fn fen_chars_round_trip_color() {
        let knight = Piece::from_fen_char('n').unwrap();
        assert_eq!(knight.kind, PieceKind::Knight);
        assert_eq!(knight.color, Color::Black);
        assert_eq!(knight.fen_char(), 'n');
        assert_eq!(knight.to_string(), "BN");
        assert!(Piece::from_fen_char('x').is_none());
    }

    #[test]
    fn slide_dirs_split_queen_lines() {
        assert_eq!(PieceKind::Rook.slide_dirs().len(), 4);
        assert!(PieceKind::Rook.slide_dirs().iter().all(|(r, f)| *r == 0 || *f == 0));
        assert!(PieceKind::Bishop.slide_dirs().iter().all(|(r, f)| *r != 0 && *f != 0));
        assert!(PieceKind::Knight.slide_dirs().is_empty());
    }

    #[test]
    fn piece_serializes_with_letters() {
        let json = serde_json::to_value(Piece::new(PieceKind::Queen, Color::White)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "Q", "color": "W", "move_count": 0}));
    }

    #[test]
    fn promotion_choice_accepts_letters_and_words() {
        let choice: PromotionChoice = serde_json::from_str("\"N\"").unwrap();
        assert_eq!(choice, PromotionChoice::Knight);
        let choice: PromotionChoice = serde_json::from_str("\"rook\"").unwrap();
        assert_eq!(PieceKind::from(choice), PieceKind::Rook);
        assert!(serde_json::from_str::<PromotionChoice>("\"K\"").is_err());
        assert_eq!(PromotionChoice::default(), PromotionChoice::Queen);
    }
}
