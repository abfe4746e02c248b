#![cfg(feature = "std")]

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::protocol::Packet;
use crate::transport::{Inbound, Outbound, Transport};

/// Receiving end of an in-memory link.
pub struct ChannelReader {
    rx: UnboundedReceiver<Packet>,
}

/// Sending end of an in-memory link.
pub struct ChannelWriter {
    tx: UnboundedSender<Packet>,
}

/// Two connected endpoints in one process. Dropping one side closes the
/// other's receive with an error, like a closed socket.
pub struct InMemoryTransport {
    reader: ChannelReader,
    writer: ChannelWriter,
}

impl InMemoryTransport {
    pub fn pair() -> (Self, Self) {
        let (tx1, rx1) = unbounded_channel();
        let (tx2, rx2) = unbounded_channel();
        (
            Self {
                reader: ChannelReader { rx: rx1 },
                writer: ChannelWriter { tx: tx2 },
            },
            Self {
                reader: ChannelReader { rx: rx2 },
                writer: ChannelWriter { tx: tx1 },
            },
        )
    }
}

#[async_trait::async_trait]
impl Inbound for ChannelReader {
    async fn recv(&mut self) -> anyhow::Result<Packet> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Channel closed"))
    }
}

#[async_trait::async_trait]
impl Outbound for ChannelWriter {
    async fn send(&mut self, packet: Packet) -> anyhow::Result<()> {
        self.tx
            .send(packet)
            .map_err(|_| anyhow::anyhow!("Channel closed"))
    }
}

#[async_trait::async_trait]
impl Inbound for InMemoryTransport {
    async fn recv(&mut self) -> anyhow::Result<Packet> {
        self.reader.recv().await
    }
}

#[async_trait::async_trait]
impl Outbound for InMemoryTransport {
    async fn send(&mut self, packet: Packet) -> anyhow::Result<()> {
        self.writer.send(packet).await
    }
}

impl Transport for InMemoryTransport {
    fn split(self: Box<Self>) -> (Box<dyn Inbound>, Box<dyn Outbound>) {
        let this = *self;
        (Box::new(this.reader), Box::new(this.writer))
    }
}
