use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::GameError;

pub const BOARD_SIZE: usize = 8;

/// A square on the board. Rank 0 is Black's back rank ("8"), file 0 is the "a" file.
///
/// On the wire a position is a `[rank, file]` tuple. Out-of-range tuples are
/// rejected while deserializing, so a `Position` value is always on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(i64, i64)", into = "(usize, usize)")]
pub struct Position {
    rank: usize,
    file: usize,
}

impl Position {
    pub fn new(rank: i64, file: i64) -> Result<Position, GameError> {
        let in_range = |v: i64| (0..BOARD_SIZE as i64).contains(&v);
        if in_range(rank) && in_range(file) {
            Ok(Position {
                rank: rank as usize,
                file: file as usize,
            })
        } else {
            Err(GameError::InvalidCoordinate { rank, file })
        }
    }

    /// For coordinates the engine derived itself from valid squares.
    pub(crate) const fn at(rank: usize, file: usize) -> Position {
        debug_assert!(rank < BOARD_SIZE && file < BOARD_SIZE);
        Position { rank, file }
    }

    pub fn rank(self) -> usize {
        self.rank
    }

    pub fn file(self) -> usize {
        self.file
    }

    /// The square `d_rank`/`d_file` away, if it is still on the board.
    pub fn offset(self, d_rank: isize, d_file: isize) -> Option<Position> {
        let rank = self.rank.checked_add_signed(d_rank).filter(|r| *r < BOARD_SIZE)?;
        let file = self.file.checked_add_signed(d_file).filter(|f| *f < BOARD_SIZE)?;
        Some(Position { rank, file })
    }

    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|rank| (0..BOARD_SIZE).map(move |file| Position { rank, file }))
    }

    /// Light squares are those where rank and file share parity (a8 and h1 are light).
    pub fn is_light(self) -> bool {
        self.rank % 2 == self.file % 2
    }
}

impl TryFrom<(i64, i64)> for Position {
    type Error = GameError;

    fn try_from((rank, file): (i64, i64)) -> Result<Self, Self::Error> {
        Position::new(rank, file)
    }
}

impl From<Position> for (usize, usize) {
    fn from(position: Position) -> Self {
        (position.rank, position.file)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let file = (b'A' + self.file as u8) as char;
        write!(f, "{}{}", file, BOARD_SIZE - self.rank)
    }
}

/// Parses algebraic squares such as `E2` or `h7`.
impl FromStr for Position {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidNotation(s.to_string());
        let mut chars = s.trim().chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };

        let file = file.to_ascii_uppercase();
        if !('A'..='H').contains(&file) {
            return Err(invalid());
        }
        let rank = rank.to_digit(10).filter(|r| (1..=8).contains(r)).ok_or_else(invalid)?;

        Ok(Position {
            rank: BOARD_SIZE - rank as usize,
            file: (file as u8 - b'A') as usize,
        })
    }
}
