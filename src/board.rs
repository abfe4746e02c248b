//! Board storage: the 10x10 grid plus every piece of both armies.
//!
//! The grid and each piece's [`PieceState`] are only ever changed together,
//! so a piece is at `loc` exactly when the grid holds its id at `loc`.

use alloc::collections::BTreeMap;
use core::fmt;

use crate::common::{BoardError, Loc, Team};
use crate::config::{BOARD_SIZE, LAKES, ROSTER};
use crate::piece::{Piece, PieceId, PieceState, PieceType};

const N: usize = BOARD_SIZE as usize;

/// Whether `loc` is one of the eight impassable lake cells.
pub fn is_lake(loc: Loc) -> bool {
    LAKES.iter().any(|&((r0, r1), (c0, c1))| {
        (r0..=r1).contains(&loc.row()) && (c0..=c1).contains(&loc.col())
    })
}

/// Whether `loc` lies in one of `team`'s four placement rows.
pub fn in_home_rows(team: Team, loc: Loc) -> bool {
    let start = team.home_row_start();
    loc.in_bounds() && (start..start + crate::config::HOME_ROWS).contains(&loc.row())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: [[Option<PieceId>; N]; N],
    pieces: BTreeMap<PieceId, Piece>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty grid with both full armies in reserve.
    pub fn new() -> Self {
        let mut pieces = BTreeMap::new();
        for team in [Team::Red, Team::Blue] {
            for kind in ROSTER {
                for instance in 0..kind.quantity() {
                    let id = PieceId::new(kind, team, instance);
                    pieces.insert(id, Piece::new(id));
                }
            }
        }
        Board {
            grid: [[None; N]; N],
            pieces,
        }
    }

    /// Piece occupying `loc`; `None` when empty or off the board.
    pub fn get(&self, loc: Loc) -> Option<&Piece> {
        let (r, c) = loc.index()?;
        self.grid[r][c].and_then(|id| self.pieces.get(&id))
    }

    pub fn has_piece(&self, loc: Loc) -> bool {
        self.get(loc).is_some()
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// All pieces of both teams, in id order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.values()
    }

    /// Pieces of `team` currently on the grid.
    pub fn on_board(&self, team: Team) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces
            .values()
            .filter(move |p| p.team() == team && p.location().is_some())
    }

    /// Pieces of `team` not yet placed.
    pub fn reserve(&self, team: Team) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces
            .values()
            .filter(move |p| p.team() == team && p.state() == PieceState::InReserve)
    }

    pub fn reserve_count(&self, team: Team) -> usize {
        self.reserve(team).count()
    }

    /// Lowest-numbered reserve piece of the given type and team. Both peers
    /// pick the same copy, which keeps replicas identical.
    pub fn first_in_reserve(&self, kind: PieceType, team: Team) -> Option<PieceId> {
        self.reserve(team).find(|p| p.kind() == kind).map(|p| p.id())
    }

    /// Put `id` at `loc`, lifting it from wherever it was.
    pub fn set_piece(&mut self, id: PieceId, loc: Loc) -> Result<(), BoardError> {
        let (r, c) = loc.index().ok_or(BoardError::OutOfBounds(loc))?;
        let piece = self.pieces.get(&id).ok_or(BoardError::Unknown(id))?;
        match piece.state() {
            PieceState::Captured => return Err(BoardError::Captured),
            PieceState::OnBoard(at) if at == loc => return Err(BoardError::SameLocation(loc)),
            _ => {}
        }
        if is_lake(loc) {
            return Err(BoardError::Lake(loc));
        }
        if self.grid[r][c].is_some() {
            return Err(BoardError::Occupied(loc));
        }
        self.lift(id);
        self.grid[r][c] = Some(id);
        self.set_state(id, PieceState::OnBoard(loc));
        Ok(())
    }

    /// Capture `id`, taking it off the grid for good.
    pub fn remove_piece(&mut self, id: PieceId) -> Result<(), BoardError> {
        let piece = self.pieces.get(&id).ok_or(BoardError::Unknown(id))?;
        if piece.is_captured() {
            return Err(BoardError::Captured);
        }
        self.lift(id);
        self.set_state(id, PieceState::Captured);
        Ok(())
    }

    /// Send an on-board piece back to its team's reserve.
    pub fn return_to_reserve(&mut self, id: PieceId) -> Result<(), BoardError> {
        let piece = self.pieces.get(&id).ok_or(BoardError::Unknown(id))?;
        match piece.state() {
            PieceState::OnBoard(_) => {
                self.lift(id);
                self.set_state(id, PieceState::InReserve);
                Ok(())
            }
            PieceState::InReserve => Err(BoardError::NotInReserve),
            PieceState::Captured => Err(BoardError::Captured),
        }
    }

    /// Exchange the occupants of two occupied cells.
    pub fn swap(&mut self, a: Loc, b: Loc) -> Result<(), BoardError> {
        let (ar, ac) = a.index().ok_or(BoardError::OutOfBounds(a))?;
        let (br, bc) = b.index().ok_or(BoardError::OutOfBounds(b))?;
        if a == b {
            return Err(BoardError::SameLocation(a));
        }
        let first = self.grid[ar][ac].ok_or(BoardError::Empty(a))?;
        let second = self.grid[br][bc].ok_or(BoardError::Empty(b))?;
        self.grid[ar][ac] = Some(second);
        self.grid[br][bc] = Some(first);
        self.set_state(first, PieceState::OnBoard(b));
        self.set_state(second, PieceState::OnBoard(a));
        Ok(())
    }

    pub(crate) fn reveal(&mut self, id: PieceId) {
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.reveal();
        }
    }

    /// Clear the grid cell under `id`, if any. Leaves its state to the caller.
    fn lift(&mut self, id: PieceId) {
        if let Some((r, c)) = self
            .pieces
            .get(&id)
            .and_then(|p| p.location())
            .and_then(|loc| loc.index())
        {
            self.grid[r][c] = None;
        }
    }

    fn set_state(&mut self, id: PieceId, state: PieceState) {
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.set_state(state);
        }
    }

    /// Render the grid as seen by `viewer`: own pieces and revealed enemy
    /// pieces show their symbol, hidden enemy pieces show `?`. Blue sees the
    /// board rotated so its home rows are at the bottom.
    pub fn render(&self, viewer: Team) -> BoardView<'_> {
        BoardView { board: self, viewer }
    }
}

/// Text rendering of a [`Board`] from one team's perspective.
#[derive(Debug, Clone, Copy)]
pub struct BoardView<'a> {
    board: &'a Board,
    viewer: Team,
}

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Labels are model coordinates so typed moves never need flipping.
        let flip = self.viewer == Team::Blue;
        let model = |r: i8, c: i8| {
            let loc = Loc::new(r, c);
            if flip {
                loc.inverted()
            } else {
                loc
            }
        };
        write!(f, "   ")?;
        for c in 0..BOARD_SIZE {
            write!(f, " {}", model(0, c).col())?;
        }
        writeln!(f)?;
        for r in 0..BOARD_SIZE {
            write!(f, "{:2} ", model(r, 0).row())?;
            for c in 0..BOARD_SIZE {
                let loc = model(r, c);
                let ch = match self.board.get(loc) {
                    Some(p) if p.team() == self.viewer => p.kind().symbol(),
                    Some(p) if p.revealed() => p.kind().symbol().to_ascii_lowercase(),
                    Some(_) => '?',
                    None if is_lake(loc) => '~',
                    None => '.',
                };
                write!(f, " {}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
