//! Common types for Stratego: coordinates, directions, teams and board errors.

use core::fmt;

use crate::config::BOARD_SIZE;

/// A board coordinate. Signed so that off-board neighbours can be expressed
/// and then rejected by bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Loc {
    row: i8,
    col: i8,
}

impl Loc {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    pub fn row(&self) -> i8 {
        self.row
    }

    pub fn col(&self) -> i8 {
        self.col
    }

    /// Location `dist` cells away in direction `dir`.
    pub fn relative(&self, dir: Direction, dist: i8) -> Loc {
        let (dr, dc) = dir.delta();
        Loc::new(
            self.row.saturating_add(dr.saturating_mul(dist)),
            self.col.saturating_add(dc.saturating_mul(dist)),
        )
    }

    /// Whether the location lies on the 10x10 grid.
    pub fn in_bounds(&self) -> bool {
        (0..BOARD_SIZE).contains(&self.row) && (0..BOARD_SIZE).contains(&self.col)
    }

    /// Grid indices, if on the board.
    pub(crate) fn index(&self) -> Option<(usize, usize)> {
        if self.in_bounds() {
            Some((self.row as usize, self.col as usize))
        } else {
            None
        }
    }

    /// The same cell seen from the opposite side of the table.
    pub fn inverted(&self) -> Loc {
        Loc::new(BOARD_SIZE - 1 - self.row, BOARD_SIZE - 1 - self.col)
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.row, self.col)
    }
}

/// The four cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// (row, col) step for one cell of movement.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }
}

/// Owning side of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Team {
    #[default]
    Red,
    Blue,
}

impl Team {
    pub const fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    /// First of the four rows this team places into.
    pub const fn home_row_start(self) -> i8 {
        match self {
            Team::Red => 6,
            Team::Blue => 0,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Red => f.write_str("RED"),
            Team::Blue => f.write_str("BLUE"),
        }
    }
}

/// Errors returned by board mutations. No mutation happens when one is
/// returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("location {0} is outside the board")]
    OutOfBounds(Loc),
    #[error("piece is already at {0}")]
    SameLocation(Loc),
    #[error("location {0} is a lake")]
    Lake(Loc),
    #[error("location {0} is occupied")]
    Occupied(Loc),
    #[error("no piece at {0}")]
    Empty(Loc),
    #[error("unknown piece {0}")]
    Unknown(crate::piece::PieceId),
    #[error("piece has been captured")]
    Captured,
    #[error("no matching piece left in reserve")]
    NotInReserve,
}
