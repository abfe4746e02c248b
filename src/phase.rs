//! Game phases and the transitions allowed between them.
//!
//! `Connecting -> Placement -> Battle -> GameOver`, never backwards.

use core::fmt;

use crate::common::Team;
use crate::game::ApplyError;

/// The two stages in which pieces move, as far as move generation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Placement,
    Battle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for the peers to finish their handshake.
    #[default]
    Connecting,
    /// Teams arrange their pieces. A team that declared itself ready may no
    /// longer edit; the battle starts once both are ready.
    Placement { red_ready: bool, blue_ready: bool },
    /// `turn` is the only team allowed to act.
    Battle { turn: Team },
    GameOver { winner: Team },
}

impl Phase {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Phase::Placement { .. } => Some(Stage::Placement),
            Phase::Battle { .. } => Some(Stage::Battle),
            _ => None,
        }
    }

    pub fn is_placement(&self) -> bool {
        matches!(self, Phase::Placement { .. })
    }

    pub fn is_battle(&self) -> bool {
        matches!(self, Phase::Battle { .. })
    }

    pub fn is_over(&self) -> bool {
        matches!(self, Phase::GameOver { .. })
    }

    /// Team holding the turn, during battle.
    pub fn turn(&self) -> Option<Team> {
        match self {
            Phase::Battle { turn } => Some(*turn),
            _ => None,
        }
    }

    pub fn winner(&self) -> Option<Team> {
        match self {
            Phase::GameOver { winner } => Some(*winner),
            _ => None,
        }
    }

    /// Placement with neither team ready.
    pub const fn open_placement() -> Phase {
        Phase::Placement {
            red_ready: false,
            blue_ready: false,
        }
    }

    /// Whether `team` has finished placement.
    pub fn is_ready(&self, team: Team) -> bool {
        match (*self, team) {
            (Phase::Placement { red_ready, .. }, Team::Red) => red_ready,
            (Phase::Placement { blue_ready, .. }, Team::Blue) => blue_ready,
            _ => false,
        }
    }

    /// Placement with both teams ready, waiting only on empty reserves.
    pub fn both_ready(&self) -> bool {
        self.is_ready(Team::Red) && self.is_ready(Team::Blue)
    }

    pub(crate) fn begin_placement(self) -> Result<Phase, ApplyError> {
        match self {
            Phase::Connecting => Ok(Phase::open_placement()),
            Phase::Placement { .. } => Err(ApplyError::Duplicate),
            other => Err(ApplyError::WrongPhase(other)),
        }
    }

    pub(crate) fn declare_ready(self, team: Team) -> Result<Phase, ApplyError> {
        match self {
            Phase::Placement { .. } if self.is_ready(team) => Err(ApplyError::Duplicate),
            Phase::Placement {
                red_ready,
                blue_ready,
            } => Ok(Phase::Placement {
                red_ready: red_ready || team == Team::Red,
                blue_ready: blue_ready || team == Team::Blue,
            }),
            other => Err(ApplyError::WrongPhase(other)),
        }
    }

    pub(crate) fn hand_over(self, next: Team) -> Result<Phase, ApplyError> {
        match self {
            Phase::Battle { turn } if turn.opponent() == next => Ok(Phase::Battle { turn: next }),
            Phase::Battle { .. } => Err(ApplyError::NotYourTurn(next.opponent())),
            other => Err(ApplyError::WrongPhase(other)),
        }
    }

    pub(crate) fn finish(self, winner: Team) -> Result<Phase, ApplyError> {
        match self {
            Phase::Battle { .. } => Ok(Phase::GameOver { winner }),
            Phase::GameOver { .. } => Err(ApplyError::Duplicate),
            other => Err(ApplyError::WrongPhase(other)),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Connecting => f.write_str("connecting"),
            Phase::Placement { .. } => f.write_str("placement"),
            Phase::Battle { turn } => write!(f, "battle ({} to move)", turn),
            Phase::GameOver { winner } => write!(f, "game over ({} wins)", winner),
        }
    }
}
