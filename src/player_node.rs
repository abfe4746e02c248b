#![cfg(feature = "std")]

//! Session driver: owns a player, the coordinator and the connection, and
//! is the only task that mutates game state.

use rand::rngs::SmallRng;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::time::Duration;

use crate::common::Team;
use crate::connection::{self, Event, Link, Role, SessionConfig};
use crate::coordinator::TurnCoordinator;
use crate::game::{Applied, GameModel, Origin};
use crate::player::{Player, RandomPlayer};
use crate::transport::in_memory::InMemoryTransport;
use crate::transport::Transport;

/// How a finished session ended, from this side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Outcome {
    pub winner: Team,
    pub local_team: Team,
}

impl Outcome {
    pub fn won(&self) -> bool {
        self.winner == self.local_team
    }
}

pub struct PlayerNode {
    player: Box<dyn Player>,
    coordinator: TurnCoordinator,
    transport: Option<Box<dyn Transport>>,
    role: Role,
    start_delay: Duration,
    moves: usize,
}

impl PlayerNode {
    pub fn new(player: Box<dyn Player>, role: Role, transport: Box<dyn Transport>) -> Self {
        let config = SessionConfig {
            role,
            ..SessionConfig::default()
        };
        Self::with_config(player, &config, transport)
    }

    pub fn with_config(
        player: Box<dyn Player>,
        config: &SessionConfig,
        transport: Box<dyn Transport>,
    ) -> Self {
        let coordinator =
            TurnCoordinator::new(GameModel::new(), config.role.team(), config.placement_secs);
        Self {
            player,
            coordinator,
            transport: Some(transport),
            role: config.role,
            start_delay: config.start_delay,
            moves: 0,
        }
    }

    pub fn team(&self) -> Team {
        self.coordinator.team()
    }

    pub fn coordinator(&self) -> &TurnCoordinator {
        &self.coordinator
    }

    /// Battle moves made by the local player.
    pub fn move_count(&self) -> usize {
        self.moves
    }

    async fn relay(link: &mut Link, applied: &[Applied]) -> anyhow::Result<()> {
        for a in applied.iter().filter(|a| a.should_relay()) {
            link.send(&a.message).await?;
        }
        Ok(())
    }

    /// Play one game to the end. Fails if the connection breaks first.
    pub async fn run(&mut self, rng: &mut SmallRng) -> anyhow::Result<Outcome> {
        let transport = self
            .transport
            .take()
            .ok_or_else(|| anyhow::anyhow!("session already played"))?;
        let (tx, mut events) = unbounded_channel();
        let mut link = connection::open(transport, self.role, self.start_delay, tx.clone()).await?;

        let team = self.team();
        self.coordinator.attach_ticks(tx);
        self.coordinator.start_placement()?;
        let picks = self.player.arrange(self.coordinator.board(), team, rng);
        for (kind, loc) in picks {
            match self.coordinator.place_piece(kind, loc) {
                Ok(applied) => Self::relay(&mut link, &applied).await?,
                Err(e) => log::warn!("skipping placement of {} at {}: {}", kind, loc, e),
            }
        }

        let result = self.play(&mut link, &mut events, rng).await;
        drop(link);
        result
    }

    async fn play(
        &mut self,
        link: &mut Link,
        events: &mut UnboundedReceiver<Event>,
        rng: &mut SmallRng,
    ) -> anyhow::Result<Outcome> {
        let team = self.team();
        loop {
            let phase = self.coordinator.phase();
            if let Some(winner) = phase.winner() {
                return Ok(Outcome {
                    winner,
                    local_team: team,
                });
            }

            if phase.turn() == Some(team) {
                let applied = match self.player.choose_move(self.coordinator.board(), team, rng) {
                    Some((from, to)) => match self.coordinator.move_piece(from, to) {
                        Ok(applied) => {
                            self.moves += 1;
                            applied
                        }
                        Err(e) => {
                            log::warn!("player chose an illegal move {} -> {}: {}", from, to, e);
                            continue;
                        }
                    },
                    None => self.coordinator.resign()?,
                };
                Self::relay(link, &applied).await?;
                continue;
            }

            let event = events
                .recv()
                .await
                .ok_or_else(|| anyhow::anyhow!("event channel closed"))?;
            let applied = match event {
                Event::Remote(message) => self.coordinator.receive(message, rng),
                Event::Tick => self.coordinator.tick(rng)?,
                Event::Disconnected => {
                    log::error!("opponent disconnected during {}", phase);
                    return Err(anyhow::anyhow!("Connection closed by peer"));
                }
            };
            for a in applied.iter().filter(|a| a.origin == Origin::Remote) {
                self.player.handle_remote(a, self.coordinator.board(), team);
            }
            Self::relay(link, &applied).await?;
        }
    }
}

/// Both sides of a finished in-process game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalGame {
    pub red: Outcome,
    pub blue: Outcome,
    pub red_moves: usize,
    pub blue_moves: usize,
}

/// Play two [`RandomPlayer`]s against each other over an in-memory link,
/// with placement closing at once.
pub async fn play_local(
    mut red_rng: SmallRng,
    mut blue_rng: SmallRng,
) -> anyhow::Result<LocalGame> {
    let (red_link, blue_link) = InMemoryTransport::pair();
    let config = |role| SessionConfig {
        role,
        placement_secs: 0,
        ..SessionConfig::default()
    };
    let mut red = PlayerNode::with_config(
        Box::new(RandomPlayer::new()),
        &config(Role::Listener),
        Box::new(red_link),
    );
    let mut blue = PlayerNode::with_config(
        Box::new(RandomPlayer::new()),
        &config(Role::Initiator),
        Box::new(blue_link),
    );
    let (red_outcome, blue_outcome) =
        tokio::try_join!(red.run(&mut red_rng), blue.run(&mut blue_rng))?;
    Ok(LocalGame {
        red: red_outcome,
        blue: blue_outcome,
        red_moves: red.move_count(),
        blue_moves: blue.move_count(),
    })
}
