//! Piece definitions: ranks, starting quantities and per-piece state.

use core::fmt;

use crate::common::{Loc, Team};

/// The twelve piece ranks of a standard army.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceType {
    Flag,
    Bomb,
    Spy,
    Scout,
    Miner,
    Sergeant,
    Lieutenant,
    Captain,
    Major,
    Colonel,
    General,
    Marshall,
}

impl PieceType {
    /// Battle strength. Flag and bomb never attack, so their ranks only
    /// matter when they are attacked.
    pub const fn rank(self) -> i8 {
        match self {
            PieceType::Flag => -1,
            PieceType::Bomb => 0,
            PieceType::Spy => 1,
            PieceType::Scout => 2,
            PieceType::Miner => 3,
            PieceType::Sergeant => 4,
            PieceType::Lieutenant => 5,
            PieceType::Captain => 6,
            PieceType::Major => 7,
            PieceType::Colonel => 8,
            PieceType::General => 9,
            PieceType::Marshall => 10,
        }
    }

    /// Number of pieces of this type each team starts with.
    pub const fn quantity(self) -> u8 {
        match self {
            PieceType::Flag => 1,
            PieceType::Bomb => 6,
            PieceType::Spy => 1,
            PieceType::Scout => 8,
            PieceType::Miner => 5,
            PieceType::Sergeant => 4,
            PieceType::Lieutenant => 4,
            PieceType::Captain => 4,
            PieceType::Major => 3,
            PieceType::Colonel => 2,
            PieceType::General => 1,
            PieceType::Marshall => 1,
        }
    }

    /// Whether the piece can ever leave its cell.
    pub const fn is_movable(self) -> bool {
        !matches!(self, PieceType::Flag | PieceType::Bomb)
    }

    pub const fn name(self) -> &'static str {
        match self {
            PieceType::Flag => "FLAG",
            PieceType::Bomb => "BOMB",
            PieceType::Spy => "SPY",
            PieceType::Scout => "SCOUT",
            PieceType::Miner => "MINER",
            PieceType::Sergeant => "SERGEANT",
            PieceType::Lieutenant => "LIEUTENANT",
            PieceType::Captain => "CAPTAIN",
            PieceType::Major => "MAJOR",
            PieceType::Colonel => "COLONEL",
            PieceType::General => "GENERAL",
            PieceType::Marshall => "MARSHALL",
        }
    }

    /// Single character used by the text board.
    pub const fn symbol(self) -> char {
        match self {
            PieceType::Flag => 'F',
            PieceType::Bomb => 'B',
            PieceType::Spy => 'S',
            PieceType::Scout => '2',
            PieceType::Miner => '3',
            PieceType::Sergeant => '4',
            PieceType::Lieutenant => '5',
            PieceType::Captain => '6',
            PieceType::Major => '7',
            PieceType::Colonel => '8',
            PieceType::General => '9',
            PieceType::Marshall => 'M',
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a piece: its type, its owner and which of the identical
/// copies it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId {
    pub team: Team,
    pub kind: PieceType,
    pub instance: u8,
}

impl PieceId {
    pub const fn new(kind: PieceType, team: Team, instance: u8) -> Self {
        Self {
            team,
            kind,
            instance,
        }
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} #{}", self.kind, self.team, self.instance)
    }
}

/// Where a piece currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceState {
    OnBoard(Loc),
    InReserve,
    Captured,
}

/// A single piece and what the opponent knows about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    id: PieceId,
    state: PieceState,
    revealed: bool,
}

impl Piece {
    pub(crate) const fn new(id: PieceId) -> Self {
        Self {
            id,
            state: PieceState::InReserve,
            revealed: false,
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn kind(&self) -> PieceType {
        self.id.kind
    }

    pub fn team(&self) -> Team {
        self.id.team
    }

    pub fn rank(&self) -> i8 {
        self.id.kind.rank()
    }

    pub fn state(&self) -> PieceState {
        self.state
    }

    /// Current cell, if the piece is on the board.
    pub fn location(&self) -> Option<Loc> {
        match self.state {
            PieceState::OnBoard(loc) => Some(loc),
            _ => None,
        }
    }

    pub fn is_captured(&self) -> bool {
        self.state == PieceState::Captured
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    pub(crate) fn set_state(&mut self, state: PieceState) {
        self.state = state;
    }

    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
    }
}
