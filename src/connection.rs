#![cfg(feature = "std")]

//! Session setup: socket roles, the readiness handshake and the receive loop
//! that feeds decoded messages to the state-mutation task.

use std::string::String;

use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::common::Team;
use crate::config::{DEFAULT_PORT, PLACEMENT_PHASE_SECS};
use crate::protocol::{Message, Packet, PROTOCOL_VERSION};
use crate::transport::tcp::TcpTransport;
use crate::transport::{Inbound, Outbound, Transport};

/// Which side of the socket this process is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Binds and waits for the opponent. Plays RED.
    Listener,
    /// Connects to a waiting opponent. Plays BLUE.
    Initiator,
}

impl Role {
    pub fn team(self) -> Team {
        match self {
            Role::Listener => Team::Red,
            Role::Initiator => Team::Blue,
        }
    }
}

/// Runtime options for one game session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub role: Role,
    pub placement_secs: u32,
    /// Extra pause after the handshake, before the first phase message.
    pub start_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: DEFAULT_PORT,
            role: Role::Listener,
            placement_secs: PLACEMENT_PHASE_SECS,
            start_delay: Duration::ZERO,
        }
    }
}

impl SessionConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Everything the state-mutation task reacts to, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Remote(Message),
    /// One second of the placement countdown elapsed.
    Tick,
    Disconnected,
}

/// Open the TCP link described by `config`: accept exactly one peer as
/// listener, or connect as initiator.
pub async fn establish(config: &SessionConfig) -> anyhow::Result<TcpTransport> {
    match config.role {
        Role::Listener => {
            let listener = TcpListener::bind(config.addr()).await?;
            log::info!("waiting for opponent on {}", listener.local_addr()?);
            accept(listener).await
        }
        Role::Initiator => {
            let transport = TcpTransport::connect(config.addr()).await?;
            log::info!("connected to {}", config.addr());
            Ok(transport)
        }
    }
}

/// Accept a single peer and stop listening.
pub async fn accept(listener: TcpListener) -> anyhow::Result<TcpTransport> {
    let (stream, peer) = listener.accept().await?;
    log::info!("opponent connected from {}", peer);
    Ok(TcpTransport::new(stream))
}

/// Confirm both ends speak the same protocol before any game traffic.
pub async fn handshake(transport: &mut dyn Transport, role: Role) -> anyhow::Result<()> {
    match role {
        Role::Initiator => {
            transport
                .send(Packet::Handshake {
                    version: PROTOCOL_VERSION,
                })
                .await?;
            match transport.recv().await? {
                Packet::HandshakeAck { version } if version == PROTOCOL_VERSION => Ok(()),
                Packet::HandshakeAck { version } => {
                    log::error!(
                        "handshake version mismatch: expected {}, peer responded with {}",
                        PROTOCOL_VERSION,
                        version
                    );
                    Err(anyhow::anyhow!(
                        "Protocol version mismatch in HandshakeAck: expected {}, got {}",
                        PROTOCOL_VERSION,
                        version
                    ))
                }
                other => {
                    log::error!("expected HandshakeAck, got {:?}", other);
                    Err(anyhow::anyhow!(
                        "Expected HandshakeAck, got unexpected packet (closing session)"
                    ))
                }
            }
        }
        Role::Listener => match transport.recv().await? {
            Packet::Handshake { version } if version == PROTOCOL_VERSION => {
                transport
                    .send(Packet::HandshakeAck {
                        version: PROTOCOL_VERSION,
                    })
                    .await
            }
            Packet::Handshake { version } => {
                log::error!(
                    "handshake version mismatch: expected {}, peer sent {}",
                    PROTOCOL_VERSION,
                    version
                );
                Err(anyhow::anyhow!(
                    "Protocol version mismatch in Handshake: expected {}, got {}",
                    PROTOCOL_VERSION,
                    version
                ))
            }
            other => {
                log::error!("expected Handshake, got {:?}", other);
                Err(anyhow::anyhow!(
                    "Expected Handshake, got unexpected packet (closing session)"
                ))
            }
        },
    }
}

/// Forward every decoded message from `inbound` to `events` until the link
/// fails or the receiver goes away. The last event sent is always
/// [`Event::Disconnected`].
pub fn spawn_receive_loop(
    mut inbound: Box<dyn Inbound>,
    events: UnboundedSender<Event>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let packet = match inbound.recv().await {
                Ok(packet) => packet,
                Err(e) => {
                    log::info!("connection closed: {}", e);
                    break;
                }
            };
            let message = match packet {
                Packet::Record(record) => match Message::try_from(record) {
                    Ok(message) => message,
                    Err(e) => {
                        log::warn!("dropping connection: {}", e);
                        break;
                    }
                },
                other => {
                    log::warn!("unexpected packet after handshake: {:?}", other);
                    break;
                }
            };
            log::debug!("received {}", message);
            if events.send(Event::Remote(message)).is_err() {
                return;
            }
        }
        let _ = events.send(Event::Disconnected);
    })
}

/// A connected session after the handshake: the send half plus the task
/// pumping received messages into the event channel.
pub struct Link {
    pub outbound: Box<dyn Outbound>,
    receiver: JoinHandle<()>,
}

impl Link {
    /// Send one message to the peer.
    pub async fn send(&mut self, message: &Message) -> anyhow::Result<()> {
        log::debug!("sending {}", message);
        self.outbound.send(Packet::from(message)).await
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.receiver.abort();
    }
}

/// Handshake over `transport`, wait `start_delay`, then split it and start
/// the receive loop.
pub async fn open(
    mut transport: Box<dyn Transport>,
    role: Role,
    start_delay: Duration,
    events: UnboundedSender<Event>,
) -> anyhow::Result<Link> {
    handshake(transport.as_mut(), role).await?;
    log::info!("handshake complete, playing {}", role.team());
    if !start_delay.is_zero() {
        tokio::time::sleep(start_delay).await;
    }
    let (inbound, outbound) = transport.split();
    let receiver = spawn_receive_loop(inbound, events);
    Ok(Link { outbound, receiver })
}
