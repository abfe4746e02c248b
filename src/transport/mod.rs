use crate::protocol::Packet;

/// Receiving half of a connection. Owned by the receive-loop task.
#[async_trait::async_trait]
pub trait Inbound: Send {
    async fn recv(&mut self) -> anyhow::Result<Packet>;
}

/// Sending half of a connection. Owned by the state-mutation task.
#[async_trait::async_trait]
pub trait Outbound: Send {
    async fn send(&mut self, packet: Packet) -> anyhow::Result<()>;
}

/// A reliable, ordered, full-duplex packet link to exactly one peer.
pub trait Transport: Inbound + Outbound {
    /// Separate the link so reads and writes can live on different tasks.
    fn split(self: Box<Self>) -> (Box<dyn Inbound>, Box<dyn Outbound>);
}

#[cfg(feature = "std")]
pub mod tcp;
#[cfg(feature = "std")]
pub mod in_memory;
