//! Messages exchanged between peers and their on-the-wire record form.

use core::fmt;

use crate::common::{Loc, Team};
use crate::piece::PieceType;

/// Version exchanged during the readiness handshake.
pub const PROTOCOL_VERSION: u16 = 1;

/// A change to the pieces on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceUpdate {
    /// A reserve piece of `kind` was put on `to`.
    Placement { to: Loc, kind: PieceType, team: Team },
    /// The piece at `from` moved to `to`. During placement, moving onto an
    /// own piece swaps the two.
    Move { from: Loc, to: Loc, team: Team },
    /// The piece at `from` left the board.
    Remove { from: Loc },
    /// The pieces at `winner` and `loser` fought. On a tie both fall and
    /// the labels are arbitrary.
    Battle { winner: Loc, loser: Loc, tie: bool },
}

/// Every state transition of a game, local or remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    BeginPlacement,
    /// The named team finished placement. The battle starts once both have.
    BeginBattle(Team),
    PieceUpdate(PieceUpdate),
    EndOfTurn(Team),
    GameOver(Team),
}

impl Message {
    /// Whether the message must be sent to the peer when it originates
    /// locally. Each peer starts placement on its own after the handshake.
    pub fn is_replicated(&self) -> bool {
        !matches!(self, Message::BeginPlacement)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::BeginPlacement => f.write_str("BEGIN_PLACEMENT"),
            Message::BeginBattle(team) => write!(f, "BEGIN_GAME({})", team),
            Message::PieceUpdate(PieceUpdate::Placement { to, kind, team }) => {
                write!(f, "PLACE({} {} at {})", team, kind, to)
            }
            Message::PieceUpdate(PieceUpdate::Move { from, to, team }) => {
                write!(f, "MOVE({} {} -> {})", team, from, to)
            }
            Message::PieceUpdate(PieceUpdate::Remove { from }) => write!(f, "REMOVE({})", from),
            Message::PieceUpdate(PieceUpdate::Battle { winner, loser, tie }) => {
                write!(f, "BATTLE({} vs {}, tie={})", winner, loser, tie)
            }
            Message::EndOfTurn(team) => write!(f, "END_OF_TURN({})", team),
            Message::GameOver(team) => write!(f, "GAME_OVER({})", team),
        }
    }
}

/// Discriminant carried by every [`WireRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    BeginPlacement,
    BeginGame,
    PieceUpdate,
    EndOfTurn,
    GameOver,
}

/// Flat record sent over the connection, one per message. Which optional
/// fields are present tells the piece-update variants apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct WireRecord {
    pub kind: Kind,
    pub team: Team,
    pub from: Option<Loc>,
    pub to: Option<Loc>,
    pub piece_type: Option<PieceType>,
    pub tie: Option<bool>,
}

impl WireRecord {
    fn bare(kind: Kind, team: Team) -> Self {
        Self {
            kind,
            team,
            from: None,
            to: None,
            piece_type: None,
            tie: None,
        }
    }
}

/// A record whose fields do not describe any message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed {0:?} record")]
    Malformed(Kind),
}

impl From<&Message> for WireRecord {
    fn from(msg: &Message) -> Self {
        match *msg {
            // Messages without a team still fill the field; receivers ignore it.
            Message::BeginPlacement => WireRecord::bare(Kind::BeginPlacement, Team::default()),
            Message::BeginBattle(team) => WireRecord::bare(Kind::BeginGame, team),
            Message::EndOfTurn(team) => WireRecord::bare(Kind::EndOfTurn, team),
            Message::GameOver(team) => WireRecord::bare(Kind::GameOver, team),
            Message::PieceUpdate(update) => {
                let mut rec = WireRecord::bare(Kind::PieceUpdate, Team::default());
                match update {
                    PieceUpdate::Placement { to, kind, team } => {
                        rec.to = Some(to);
                        rec.piece_type = Some(kind);
                        rec.team = team;
                    }
                    PieceUpdate::Move { from, to, team } => {
                        rec.from = Some(from);
                        rec.to = Some(to);
                        rec.team = team;
                    }
                    PieceUpdate::Remove { from } => {
                        rec.from = Some(from);
                    }
                    PieceUpdate::Battle { winner, loser, tie } => {
                        rec.from = Some(winner);
                        rec.to = Some(loser);
                        rec.tie = Some(tie);
                    }
                }
                rec
            }
        }
    }
}

impl TryFrom<WireRecord> for Message {
    type Error = ProtocolError;

    fn try_from(rec: WireRecord) -> Result<Self, Self::Error> {
        let malformed = ProtocolError::Malformed(rec.kind);
        match rec.kind {
            Kind::BeginPlacement => Ok(Message::BeginPlacement),
            Kind::BeginGame => Ok(Message::BeginBattle(rec.team)),
            Kind::EndOfTurn => Ok(Message::EndOfTurn(rec.team)),
            Kind::GameOver => Ok(Message::GameOver(rec.team)),
            Kind::PieceUpdate => {
                let update = match (rec.from, rec.to, rec.piece_type, rec.tie) {
                    (None, Some(to), Some(kind), None) => PieceUpdate::Placement {
                        to,
                        kind,
                        team: rec.team,
                    },
                    (Some(winner), Some(loser), None, Some(tie)) => {
                        PieceUpdate::Battle { winner, loser, tie }
                    }
                    (Some(from), Some(to), None, None) => PieceUpdate::Move {
                        from,
                        to,
                        team: rec.team,
                    },
                    (Some(from), None, None, None) => PieceUpdate::Remove { from },
                    _ => return Err(malformed),
                };
                Ok(Message::PieceUpdate(update))
            }
        }
    }
}

/// Unit of transmission: handshake packets, then one record per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Packet {
    Handshake { version: u16 },
    HandshakeAck { version: u16 },
    Record(WireRecord),
}

impl From<&Message> for Packet {
    fn from(msg: &Message) -> Self {
        Packet::Record(WireRecord::from(msg))
    }
}
