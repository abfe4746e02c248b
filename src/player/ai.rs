use alloc::vec::Vec;

use rand::rngs::SmallRng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::board::Board;
use crate::common::{Loc, Team};
use crate::phase::Stage;
use crate::piece::PieceType;
use crate::rules::{self, Source};

use super::Player;

/// Places its army in random order and plays random legal moves, taking
/// an attack whenever one is available.
#[derive(Debug, Default)]
pub struct RandomPlayer;

impl RandomPlayer {
    pub fn new() -> Self {
        Self
    }
}

/// Every legal battle move of `team`, as (from, to) pairs.
pub fn all_moves(board: &Board, team: Team) -> Vec<(Loc, Loc)> {
    board
        .on_board(team)
        .filter_map(|p| p.location())
        .flat_map(|from| {
            rules::legal_moves(board, Stage::Battle, Source::Board(from), team)
                .into_iter()
                .map(move |to| (from, to))
        })
        .collect()
}

impl Player for RandomPlayer {
    fn arrange(&mut self, board: &Board, team: Team, rng: &mut SmallRng) -> Vec<(PieceType, Loc)> {
        let mut cells: Vec<Loc> =
            rules::legal_moves(board, Stage::Placement, Source::Reserve, team)
                .into_iter()
                .collect();
        cells.shuffle(rng);
        board.reserve(team).map(|p| p.kind()).zip(cells).collect()
    }

    fn choose_move(&mut self, board: &Board, team: Team, rng: &mut SmallRng) -> Option<(Loc, Loc)> {
        let moves = all_moves(board, team);
        let attacks: Vec<(Loc, Loc)> = moves
            .iter()
            .copied()
            .filter(|&(_, to)| board.has_piece(to))
            .collect();
        if attacks.is_empty() {
            moves.choose(rng).copied()
        } else {
            attacks.choose(rng).copied()
        }
    }
}
