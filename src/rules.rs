//! Pure rules: legal destinations for a piece and battle resolution.
//!
//! Nothing here mutates state. Both peers evaluate the same functions on
//! the same inputs, so results must depend only on the arguments.

use alloc::collections::BTreeSet;

use crate::board::{in_home_rows, Board};
use crate::common::{Direction, Loc, Team};
use crate::config::{BOARD_SIZE, HOME_ROWS};
use crate::phase::Stage;
use crate::piece::PieceType;

pub use crate::board::is_lake;

/// What is being moved: a piece already on the board, or one from reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Reserve,
    Board(Loc),
}

/// Result of one piece attacking another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    AttackerWins,
    DefenderWins,
    Tie,
}

/// Decide a battle from the two piece types alone.
pub fn resolve(attacker: PieceType, defender: PieceType) -> BattleOutcome {
    if defender == PieceType::Bomb {
        return if attacker == PieceType::Miner {
            BattleOutcome::AttackerWins
        } else {
            BattleOutcome::DefenderWins
        };
    }
    if attacker == PieceType::Spy && defender == PieceType::Marshall {
        return BattleOutcome::AttackerWins;
    }
    match attacker.rank().cmp(&defender.rank()) {
        core::cmp::Ordering::Greater => BattleOutcome::AttackerWins,
        core::cmp::Ordering::Less => BattleOutcome::DefenderWins,
        core::cmp::Ordering::Equal => BattleOutcome::Tie,
    }
}

/// How far a piece of `kind` may travel in one direction.
fn scan_limit(kind: PieceType) -> i8 {
    match kind {
        PieceType::Flag | PieceType::Bomb => 0,
        PieceType::Scout => BOARD_SIZE,
        _ => 1,
    }
}

pub fn in_bounds(loc: Loc) -> bool {
    loc.in_bounds()
}

/// Rows `team` places its army in.
pub fn home_rows(team: Team) -> core::ops::Range<i8> {
    let start = team.home_row_start();
    start..start + HOME_ROWS
}

/// Every cell in `team`'s home rows, in row-major order.
pub fn home_cells(team: Team) -> impl Iterator<Item = Loc> {
    home_rows(team).flat_map(|r| (0..BOARD_SIZE).map(move |c| Loc::new(r, c)))
}

/// Legal destinations for `source`, moved by `team`, during `stage`.
///
/// Never fails: a missing, foreign or off-board source yields an empty set.
pub fn legal_moves(board: &Board, stage: Stage, source: Source, team: Team) -> BTreeSet<Loc> {
    match (stage, source) {
        (Stage::Placement, Source::Reserve) => home_cells(team)
            .filter(|&loc| !board.has_piece(loc))
            .collect(),
        (Stage::Placement, Source::Board(from)) => match board.get(from) {
            Some(piece) if piece.team() == team && in_home_rows(team, from) => {
                home_cells(team).collect()
            }
            _ => BTreeSet::new(),
        },
        (Stage::Battle, Source::Board(from)) => battle_moves(board, from, team),
        (Stage::Battle, Source::Reserve) => BTreeSet::new(),
    }
}

fn battle_moves(board: &Board, from: Loc, team: Team) -> BTreeSet<Loc> {
    let mut moves = BTreeSet::new();
    let piece = match board.get(from) {
        Some(piece) if piece.team() == team => piece,
        _ => return moves,
    };
    let limit = scan_limit(piece.kind());
    for dir in Direction::ALL {
        let mut current = from;
        for _ in 0..limit {
            current = current.relative(dir, 1);
            if !current.in_bounds() || is_lake(current) {
                break;
            }
            if let Some(other) = board.get(current) {
                if other.team() != team {
                    moves.insert(current);
                }
                break;
            }
            moves.insert(current);
        }
    }
    moves
}

/// Whether any piece of `team` has at least one legal battle move.
pub fn has_movable_piece(board: &Board, team: Team) -> bool {
    board.on_board(team).any(|piece| {
        piece
            .location()
            .is_some_and(|loc| !battle_moves(board, loc, team).is_empty())
    })
}
