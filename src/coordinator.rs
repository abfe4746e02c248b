//! Local actions, turn gating and the placement countdown for one team.
//!
//! Every method that changes state returns the [`Applied`] messages it
//! produced, in order. The caller relays those whose
//! [`Applied::should_relay`] is true.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::board::Board;
use crate::common::{Loc, Team};
use crate::game::{Applied, ApplyError, GameModel, Origin};
use crate::phase::{Phase, Stage};
use crate::piece::PieceType;
use crate::protocol::{Message, PieceUpdate};
use crate::rules::{self, BattleOutcome, Source};

#[cfg(feature = "std")]
use crate::connection::Event;
#[cfg(feature = "std")]
use tokio::sync::mpsc::UnboundedSender;

/// Background task emitting [`Event::Tick`] once a second. Aborted on drop.
#[cfg(feature = "std")]
struct Ticker(tokio::task::JoinHandle<()>);

#[cfg(feature = "std")]
impl Ticker {
    fn spawn(events: UnboundedSender<Event>) -> Self {
        Ticker(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(1));
            loop {
                interval.tick().await;
                if events.send(Event::Tick).is_err() {
                    break;
                }
            }
        }))
    }
}

#[cfg(feature = "std")]
impl Drop for Ticker {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub struct TurnCoordinator {
    model: GameModel,
    team: Team,
    placement_secs: u32,
    /// Seconds left while the countdown runs.
    countdown: Option<u32>,
    #[cfg(feature = "std")]
    events: Option<UnboundedSender<Event>>,
    #[cfg(feature = "std")]
    ticker: Option<Ticker>,
}

impl TurnCoordinator {
    pub fn new(model: GameModel, team: Team, placement_secs: u32) -> Self {
        Self {
            model,
            team,
            placement_secs,
            countdown: None,
            #[cfg(feature = "std")]
            events: None,
            #[cfg(feature = "std")]
            ticker: None,
        }
    }

    /// Deliver countdown ticks on `events` instead of waiting for manual
    /// [`TurnCoordinator::tick`] calls. Needs a tokio runtime.
    #[cfg(feature = "std")]
    pub fn attach_ticks(&mut self, events: UnboundedSender<Event>) {
        self.events = Some(events);
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn model(&self) -> &GameModel {
        &self.model
    }

    pub fn board(&self) -> &Board {
        self.model.board()
    }

    pub fn phase(&self) -> Phase {
        self.model.phase()
    }

    /// Seconds left before placement closes, while the countdown runs.
    pub fn remaining_secs(&self) -> Option<u32> {
        self.countdown
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Applied) + Send + 'static,
    {
        self.model.subscribe(listener);
    }

    /// Legal destinations for the local team. With `from_reserve` the
    /// location is ignored and placement cells are returned.
    pub fn get_moves(&self, loc: Loc, from_reserve: bool) -> BTreeSet<Loc> {
        let Some(stage) = self.phase().stage() else {
            return BTreeSet::new();
        };
        let source = if from_reserve {
            Source::Reserve
        } else {
            Source::Board(loc)
        };
        rules::legal_moves(self.model.board(), stage, source, self.team)
    }

    pub fn is_lake(&self, loc: Loc) -> bool {
        rules::is_lake(loc)
    }

    pub fn has_piece(&self, loc: Loc) -> bool {
        self.model.has_piece(loc)
    }

    /// Whether the local team has won.
    pub fn is_game_over(&self) -> bool {
        self.model.is_game_over(self.team.opponent())
    }

    fn apply_local(&mut self, message: Message, out: &mut Vec<Applied>) -> Result<(), ApplyError> {
        let applied = self.model.process_update(message, Origin::Local)?;
        out.push(applied);
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), ApplyError> {
        let phase = self.phase();
        if phase.is_placement() && !phase.is_ready(self.team) {
            Ok(())
        } else {
            Err(ApplyError::WrongPhase(phase))
        }
    }

    /// Enter placement after the handshake and start the countdown.
    pub fn start_placement(&mut self) -> Result<Vec<Applied>, ApplyError> {
        let mut out = Vec::new();
        self.apply_local(Message::BeginPlacement, &mut out)?;
        self.countdown = Some(self.placement_secs);
        self.start_ticker();
        log::info!("placement phase started, {} seconds", self.placement_secs);
        Ok(out)
    }

    /// Put a reserve piece of `kind` on an empty home cell.
    pub fn place_piece(&mut self, kind: PieceType, loc: Loc) -> Result<Vec<Applied>, ApplyError> {
        self.ensure_editable()?;
        let mut out = Vec::new();
        self.apply_local(
            Message::PieceUpdate(PieceUpdate::Placement {
                to: loc,
                kind,
                team: self.team,
            }),
            &mut out,
        )?;
        Ok(out)
    }

    /// Send an own piece back to reserve during placement.
    pub fn remove_piece(&mut self, loc: Loc) -> Result<Vec<Applied>, ApplyError> {
        self.ensure_editable()?;
        match self.model.get_piece(loc) {
            Some(piece) if piece.team() == self.team => {}
            Some(_) => return Err(ApplyError::NotOwner(loc)),
            None => return Err(crate::common::BoardError::Empty(loc).into()),
        }
        let mut out = Vec::new();
        self.apply_local(
            Message::PieceUpdate(PieceUpdate::Remove { from: loc }),
            &mut out,
        )?;
        Ok(out)
    }

    /// Move (or during placement, swap) a local piece. In battle an enemy
    /// on `to` is attacked, and the turn passes or the game ends.
    pub fn move_piece(&mut self, from: Loc, to: Loc) -> Result<Vec<Applied>, ApplyError> {
        match self.phase() {
            Phase::Placement { .. } => {
                self.ensure_editable()?;
                let mut out = Vec::new();
                self.apply_local(
                    Message::PieceUpdate(PieceUpdate::Move {
                        from,
                        to,
                        team: self.team,
                    }),
                    &mut out,
                )?;
                Ok(out)
            }
            Phase::Battle { turn } => {
                if turn != self.team {
                    return Err(ApplyError::NotYourTurn(self.team));
                }
                if !self.get_moves(from, false).contains(&to) {
                    return Err(ApplyError::IllegalMove { from, to });
                }
                let update = match (self.model.get_piece(from), self.model.get_piece(to)) {
                    (Some(attacker), Some(defender)) => {
                        match rules::resolve(attacker.kind(), defender.kind()) {
                            BattleOutcome::AttackerWins => PieceUpdate::Battle {
                                winner: from,
                                loser: to,
                                tie: false,
                            },
                            BattleOutcome::DefenderWins => PieceUpdate::Battle {
                                winner: to,
                                loser: from,
                                tie: false,
                            },
                            BattleOutcome::Tie => PieceUpdate::Battle {
                                winner: from,
                                loser: to,
                                tie: true,
                            },
                        }
                    }
                    _ => PieceUpdate::Move {
                        from,
                        to,
                        team: self.team,
                    },
                };
                let mut out = Vec::new();
                self.apply_local(Message::PieceUpdate(update), &mut out)?;
                self.finish_turn(&mut out)?;
                Ok(out)
            }
            other => Err(ApplyError::WrongPhase(other)),
        }
    }

    fn finish_turn(&mut self, out: &mut Vec<Applied>) -> Result<(), ApplyError> {
        let opponent = self.team.opponent();
        let next = if self.model.is_game_over(opponent) {
            Message::GameOver(self.team)
        } else if self.model.is_game_over(self.team) {
            Message::GameOver(opponent)
        } else {
            Message::EndOfTurn(opponent)
        };
        if let Message::GameOver(winner) = next {
            log::info!("game over, {} wins", winner);
        }
        self.apply_local(next, out)
    }

    /// Give up on the local turn.
    pub fn resign(&mut self) -> Result<Vec<Applied>, ApplyError> {
        match self.phase() {
            Phase::Battle { turn } if turn == self.team => {
                let mut out = Vec::new();
                log::info!("{} resigns", self.team);
                self.apply_local(Message::GameOver(self.team.opponent()), &mut out)?;
                Ok(out)
            }
            Phase::Battle { .. } => Err(ApplyError::NotYourTurn(self.team)),
            other => Err(ApplyError::WrongPhase(other)),
        }
    }

    /// Place every remaining reserve piece on a random empty home cell.
    pub fn auto_place<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<Applied>, ApplyError> {
        self.ensure_editable()?;
        let mut out = Vec::new();
        self.fill_reserve(rng, &mut out)?;
        Ok(out)
    }

    /// Clear the local arrangement and place everything again at random.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<Applied>, ApplyError> {
        self.ensure_editable()?;
        let mut out = Vec::new();
        let placed: Vec<Loc> = self
            .model
            .board()
            .on_board(self.team)
            .filter_map(|p| p.location())
            .collect();
        for from in placed {
            self.apply_local(Message::PieceUpdate(PieceUpdate::Remove { from }), &mut out)?;
        }
        self.fill_reserve(rng, &mut out)?;
        Ok(out)
    }

    fn fill_reserve<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        out: &mut Vec<Applied>,
    ) -> Result<(), ApplyError> {
        loop {
            let next = self.model.board().reserve(self.team).next().map(|p| p.kind());
            let Some(kind) = next else {
                break;
            };
            let free: Vec<Loc> = rules::legal_moves(
                self.model.board(),
                Stage::Placement,
                Source::Reserve,
                self.team,
            )
            .into_iter()
            .collect();
            let Some(&to) = free.choose(rng) else {
                break;
            };
            self.apply_local(
                Message::PieceUpdate(PieceUpdate::Placement {
                    to,
                    kind,
                    team: self.team,
                }),
                out,
            )?;
        }
        Ok(())
    }

    #[cfg(feature = "std")]
    fn start_ticker(&mut self) {
        if let Some(events) = self.events.clone() {
            self.ticker = Some(Ticker::spawn(events));
        }
    }

    #[cfg(not(feature = "std"))]
    fn start_ticker(&mut self) {}

    fn cancel_countdown(&mut self) {
        self.countdown = None;
        #[cfg(feature = "std")]
        drop(self.ticker.take());
    }

    /// Close placement for this side: fill the reserve and declare the
    /// local team ready.
    fn declare_battle<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        out: &mut Vec<Applied>,
    ) -> Result<(), ApplyError> {
        self.ensure_editable()?;
        self.cancel_countdown();
        self.fill_reserve(rng, out)?;
        log::info!("placement over for {}", self.team);
        self.apply_local(Message::BeginBattle(self.team), out)
    }

    /// Advance the countdown by one second; at zero, placement closes.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<Applied>, ApplyError> {
        let mut out = Vec::new();
        match self.countdown {
            Some(0) => self.declare_battle(rng, &mut out)?,
            Some(left) => {
                log::debug!("{} seconds remaining in placement phase", left);
                self.countdown = Some(left - 1);
            }
            None => {}
        }
        Ok(out)
    }

    /// Apply a message from the peer. Rejected messages are logged and
    /// dropped. The peer declaring itself ready closes local placement too.
    pub fn receive<R: Rng + ?Sized>(&mut self, message: Message, rng: &mut R) -> Vec<Applied> {
        let mut out = Vec::new();
        if claimed_team(&message) == Some(self.team) {
            log::warn!("rejected {} from peer: acts for {}", message, self.team);
            return out;
        }
        match self.model.process_update(message, Origin::Remote) {
            Ok(applied) => out.push(applied),
            Err(ApplyError::Duplicate) => {
                log::debug!("ignoring duplicate {}", message);
                return out;
            }
            Err(e) => {
                log::warn!("rejected {} from peer: {}", message, e);
                return out;
            }
        }
        if let Message::BeginBattle(_) = message {
            self.cancel_countdown();
            if !self.phase().is_ready(self.team) {
                if let Err(e) = self.declare_battle(rng, &mut out) {
                    log::warn!("could not close placement: {}", e);
                }
            }
        }
        out
    }
}

/// The team a message acts for, when it names one.
fn claimed_team(message: &Message) -> Option<Team> {
    match *message {
        Message::BeginBattle(team)
        | Message::PieceUpdate(PieceUpdate::Placement { team, .. })
        | Message::PieceUpdate(PieceUpdate::Move { team, .. }) => Some(team),
        _ => None,
    }
}

impl core::fmt::Debug for TurnCoordinator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TurnCoordinator")
            .field("team", &self.team)
            .field("phase", &self.model.phase())
            .field("countdown", &self.countdown)
            .finish()
    }
}
