//! Player trait and implementations
//!
//! - RandomPlayer: arranges and moves at random, preferring attacks
//! - CliPlayer: interactive command-line player

use alloc::vec::Vec;

use rand::rngs::SmallRng;

use crate::board::Board;
use crate::common::{Loc, Team};
use crate::game::Applied;
use crate::piece::PieceType;

/// Decision-maker for one team. The session driver owns the rules and the
/// connection; a player only picks placements and moves.
pub trait Player: Send {
    /// Choose cells for the reserve pieces at the start of placement.
    /// Entries that turn out illegal are skipped; pieces left over are
    /// placed at random when placement closes.
    fn arrange(&mut self, board: &Board, team: Team, rng: &mut SmallRng) -> Vec<(PieceType, Loc)>;

    /// Choose the next battle move, or `None` to resign.
    fn choose_move(&mut self, board: &Board, team: Team, rng: &mut SmallRng) -> Option<(Loc, Loc)>;

    /// Inform the player of a change made by the opponent.
    fn handle_remote(&mut self, _applied: &Applied, _board: &Board, _team: Team) {}
}

pub mod ai;
pub use ai::RandomPlayer;

#[cfg(feature = "std")]
pub mod cli;
#[cfg(feature = "std")]
pub use cli::CliPlayer;
