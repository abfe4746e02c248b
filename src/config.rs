use crate::common::Team;
use crate::piece::PieceType;

pub const BOARD_SIZE: i8 = 10;
/// Rows each team may place into during the placement phase.
pub const HOME_ROWS: i8 = 4;
/// Pieces each team starts with; fills its home rows exactly.
pub const PIECES_PER_TEAM: usize = 40;

/// Lakes as (row span, col span) pairs, inclusive.
pub const LAKES: [((i8, i8), (i8, i8)); 2] = [((4, 5), (2, 3)), ((4, 5), (6, 7))];

/// Starting roster, strongest last, in the order pieces are stored.
pub const ROSTER: [PieceType; 12] = [
    PieceType::Flag,
    PieceType::Bomb,
    PieceType::Spy,
    PieceType::Scout,
    PieceType::Miner,
    PieceType::Sergeant,
    PieceType::Lieutenant,
    PieceType::Captain,
    PieceType::Major,
    PieceType::Colonel,
    PieceType::General,
    PieceType::Marshall,
];

/// Team that moves first once the battle phase begins.
pub const STARTING_TEAM: Team = Team::Red;

/// Length of the placement countdown.
pub const PLACEMENT_PHASE_SECS: u32 = 120;

pub const DEFAULT_PORT: u16 = 4000;

/// Parse a piece type name as printed by `PieceType::name`.
pub fn piece_type_from_name(name: &str) -> Option<PieceType> {
    ROSTER
        .iter()
        .copied()
        .find(|kind| kind.name().eq_ignore_ascii_case(name))
}
