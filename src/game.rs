//! Replicated game state and the reducer both peers run on every message.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::board::{in_home_rows, Board};
use crate::common::{BoardError, Loc, Team};
use crate::config::STARTING_TEAM;
use crate::phase::{Phase, Stage};
use crate::piece::{Piece, PieceId, PieceType};
use crate::protocol::{Message, PieceUpdate};
use crate::rules::{self, BattleOutcome, Source};

/// Why a message was not applied. State is unchanged whenever one of these
/// is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("not allowed during {0}")]
    WrongPhase(Phase),
    #[error("it is not {0}'s turn")]
    NotYourTurn(Team),
    #[error("piece at {0} does not belong to the acting team")]
    NotOwner(Loc),
    #[error("{0} is outside the team's home rows")]
    OutsideHomeRows(Loc),
    #[error("illegal move {from} -> {to}")]
    IllegalMove { from: Loc, to: Loc },
    #[error("battle result does not match the pieces involved")]
    BattleMismatch,
    #[error("message already applied")]
    Duplicate,
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote,
}

/// A message the model accepted, tagged with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub message: Message,
    pub origin: Origin,
}

impl Applied {
    /// Whether this change must be forwarded to the peer.
    pub fn should_relay(&self) -> bool {
        self.origin == Origin::Local && self.message.is_replicated()
    }
}

/// Everything both replicas must agree on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameState {
    pub board: Board,
    pub phase: Phase,
}

impl GameState {
    fn start_battle_when_ready(&mut self) {
        if self.phase.both_ready()
            && self.board.reserve_count(Team::Red) == 0
            && self.board.reserve_count(Team::Blue) == 0
        {
            log::info!("all pieces placed, battle begins with {} to move", STARTING_TEAM);
            self.phase = Phase::Battle {
                turn: STARTING_TEAM,
            };
        }
    }
}

/// Reject placement edits by `team` outside placement or after it declared
/// itself ready.
fn ensure_arranging(phase: Phase, team: Team) -> Result<(), ApplyError> {
    if phase.is_placement() && !phase.is_ready(team) {
        Ok(())
    } else {
        Err(ApplyError::WrongPhase(phase))
    }
}

/// Apply `msg` to `state`. Pure with respect to its inputs: the same
/// message on the same state always has the same effect on both peers.
pub fn apply(state: &mut GameState, msg: &Message) -> Result<(), ApplyError> {
    match *msg {
        Message::BeginPlacement => state.phase = state.phase.begin_placement()?,
        Message::BeginBattle(team) => {
            state.phase = state.phase.declare_ready(team)?;
            state.start_battle_when_ready();
        }
        Message::PieceUpdate(update) => apply_piece_update(state, update)?,
        Message::EndOfTurn(next) => state.phase = state.phase.hand_over(next)?,
        Message::GameOver(winner) => state.phase = state.phase.finish(winner)?,
    }
    Ok(())
}

fn apply_piece_update(state: &mut GameState, update: PieceUpdate) -> Result<(), ApplyError> {
    let phase = state.phase;
    let board = &mut state.board;
    match update {
        PieceUpdate::Placement { to, kind, team } => {
            ensure_arranging(phase, team)?;
            if !in_home_rows(team, to) {
                return Err(ApplyError::OutsideHomeRows(to));
            }
            let id = board
                .first_in_reserve(kind, team)
                .ok_or(BoardError::NotInReserve)?;
            board.set_piece(id, to)?;
        }
        PieceUpdate::Move { from, to, team } => {
            let piece = *board.get(from).ok_or(BoardError::Empty(from))?;
            if piece.team() != team {
                return Err(ApplyError::NotOwner(from));
            }
            match phase {
                Phase::Placement { .. } => {
                    ensure_arranging(phase, team)?;
                    if !in_home_rows(team, to) {
                        return Err(ApplyError::OutsideHomeRows(to));
                    }
                    match board.get(to) {
                        Some(other) if other.team() == team => board.swap(from, to)?,
                        Some(_) => return Err(BoardError::Occupied(to).into()),
                        None => board.set_piece(piece.id(), to)?,
                    }
                }
                Phase::Battle { turn } => {
                    if turn != team {
                        return Err(ApplyError::NotYourTurn(team));
                    }
                    if board.has_piece(to)
                        || !rules::legal_moves(board, Stage::Battle, Source::Board(from), team)
                            .contains(&to)
                    {
                        return Err(ApplyError::IllegalMove { from, to });
                    }
                    board.set_piece(piece.id(), to)?;
                }
                other => return Err(ApplyError::WrongPhase(other)),
            }
        }
        PieceUpdate::Remove { from } => {
            if !phase.is_placement() {
                return Err(ApplyError::WrongPhase(phase));
            }
            let piece = *board.get(from).ok_or(BoardError::Empty(from))?;
            ensure_arranging(phase, piece.team())?;
            board.return_to_reserve(piece.id())?;
        }
        PieceUpdate::Battle { winner, loser, tie } => {
            let turn = phase.turn().ok_or(ApplyError::WrongPhase(phase))?;
            let first = *board.get(winner).ok_or(BoardError::Empty(winner))?;
            let second = *board.get(loser).ok_or(BoardError::Empty(loser))?;
            if first.team() == second.team() {
                return Err(ApplyError::IllegalMove {
                    from: winner,
                    to: loser,
                });
            }
            let (attacker, defender) = if first.team() == turn {
                (first, second)
            } else {
                (second, first)
            };
            let (from, to) = (location(&attacker)?, location(&defender)?);
            if !rules::legal_moves(board, Stage::Battle, Source::Board(from), turn).contains(&to) {
                return Err(ApplyError::IllegalMove { from, to });
            }
            let outcome = rules::resolve(attacker.kind(), defender.kind());
            let consistent = match outcome {
                BattleOutcome::Tie => tie,
                BattleOutcome::AttackerWins => !tie && first.id() == attacker.id(),
                BattleOutcome::DefenderWins => !tie && first.id() == defender.id(),
            };
            if !consistent {
                return Err(ApplyError::BattleMismatch);
            }
            board.reveal(attacker.id());
            board.reveal(defender.id());
            match outcome {
                BattleOutcome::Tie => {
                    board.remove_piece(attacker.id())?;
                    board.remove_piece(defender.id())?;
                }
                BattleOutcome::AttackerWins => {
                    board.remove_piece(defender.id())?;
                    board.set_piece(attacker.id(), to)?;
                }
                BattleOutcome::DefenderWins => board.remove_piece(attacker.id())?,
            }
            log::debug!(
                "{} attacked {}: {:?}",
                attacker.id(),
                defender.id(),
                outcome
            );
        }
    }
    Ok(())
}

fn location(piece: &Piece) -> Result<Loc, ApplyError> {
    piece
        .location()
        .ok_or(ApplyError::Board(BoardError::Unknown(piece.id())))
}

/// Callback fired after every accepted change.
pub type Listener = Box<dyn FnMut(&Applied) + Send>;

/// Authoritative board for one process. Every change funnels through
/// [`GameModel::process_update`].
pub struct GameModel {
    state: GameState,
    listeners: Vec<Listener>,
}

impl Default for GameModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GameModel {
    /// Both armies in reserve, waiting for the handshake.
    pub fn new() -> Self {
        Self::from_state(GameState::default())
    }

    /// Restore a model from a previously built state.
    pub fn from_state(state: GameState) -> Self {
        Self {
            state,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn get_piece(&self, loc: Loc) -> Option<&Piece> {
        self.state.board.get(loc)
    }

    pub fn has_piece(&self, loc: Loc) -> bool {
        self.state.board.has_piece(loc)
    }

    /// Put a piece directly on `loc`, bypassing the rules. Used to set up
    /// positions; subscribers are not notified.
    pub fn set_piece(&mut self, id: PieceId, loc: Loc) -> Result<(), BoardError> {
        self.state.board.set_piece(id, loc)
    }

    /// Capture a piece directly, bypassing the rules.
    pub fn remove_piece(&mut self, id: PieceId) -> Result<(), BoardError> {
        self.state.board.remove_piece(id)
    }

    /// True when `team` has lost: no flag on the board, or nothing it can
    /// move. Call with the opponent to ask "have I won".
    pub fn is_game_over(&self, team: Team) -> bool {
        let board = &self.state.board;
        let has_flag = board.on_board(team).any(|p| p.kind() == PieceType::Flag);
        !has_flag || !rules::has_movable_piece(board, team)
    }

    /// Register a callback for every accepted change.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Applied) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Apply `message` and notify subscribers. Rejected messages change
    /// nothing and notify no one.
    pub fn process_update(
        &mut self,
        message: Message,
        origin: Origin,
    ) -> Result<Applied, ApplyError> {
        apply(&mut self.state, &message)?;
        let applied = Applied { message, origin };
        log::trace!("applied {} ({:?})", message, origin);
        for listener in self.listeners.iter_mut() {
            listener(&applied);
        }
        Ok(applied)
    }
}

impl fmt::Debug for GameModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameModel")
            .field("phase", &self.state.phase)
            .field("board", &self.state.board)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
