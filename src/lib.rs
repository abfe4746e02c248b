#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod board;
pub mod common;
pub mod config;
#[cfg(feature = "std")]
pub mod connection;
pub mod coordinator;
pub mod game;
#[cfg(feature = "std")]
mod logging;
pub mod phase;
pub mod piece;
pub mod player;
#[cfg(feature = "std")]
pub mod player_node;
pub mod protocol;
pub mod rules;
#[cfg(feature = "std")]
pub mod transport;

pub use board::*;
pub use common::*;
pub use config::*;
#[cfg(feature = "std")]
pub use connection::{Event, Role, SessionConfig};
pub use coordinator::TurnCoordinator;
pub use game::*;
#[cfg(feature = "std")]
pub use logging::init_logging;
pub use phase::*;
pub use piece::*;
pub use player::{Player, RandomPlayer};
#[cfg(feature = "std")]
pub use player::CliPlayer;
#[cfg(feature = "std")]
pub use player_node::*;
pub use protocol::*;
#[cfg(feature = "std")]
pub use transport::tcp::TcpTransport;
