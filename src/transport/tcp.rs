#![cfg(feature = "std")]

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::Packet;
use crate::transport::{Inbound, Outbound, Transport};

/// Default timeout for a single send (30 seconds).
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest frame accepted in either direction (64 KiB).
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

fn read_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        std::io::ErrorKind::ConnectionReset => anyhow::anyhow!("Connection reset by peer"),
        _ => anyhow::anyhow!("Read error: {}", e),
    }
}

fn write_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset => {
            anyhow::anyhow!("Connection closed by peer")
        }
        _ => anyhow::anyhow!("Write error: {}", e),
    }
}

/// Serialize `packet` into a length-prefixed frame.
pub fn encode_frame(packet: &Packet, max_frame: u32) -> anyhow::Result<Vec<u8>> {
    let data =
        bincode::serialize(packet).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
    if data.len() as u64 > max_frame as u64 {
        return Err(anyhow::anyhow!(
            "Frame too large: {} bytes (max: {})",
            data.len(),
            max_frame
        ));
    }
    let mut frame = Vec::with_capacity(4 + data.len());
    frame.extend_from_slice(&(data.len() as u32).to_be_bytes());
    frame.extend_from_slice(&data);
    Ok(frame)
}

/// Read one length-prefixed frame and decode it.
pub async fn read_frame<R>(reader: &mut R, max_frame: u32) -> anyhow::Result<Packet>
where
    R: AsyncRead + Unpin + Send,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(read_error)?;
    let len = u32::from_be_bytes(len_buf);
    if len > max_frame {
        return Err(anyhow::anyhow!(
            "Frame too large: {} bytes (max: {})",
            len,
            max_frame
        ));
    }
    if len == 0 {
        return Err(anyhow::anyhow!("Invalid frame length: 0"));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await.map_err(read_error)?;
    bincode::deserialize(&buf).map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))
}

/// Encode `packet` and write it, giving up after `limit`.
pub async fn write_frame<W>(
    writer: &mut W,
    packet: &Packet,
    max_frame: u32,
    limit: Duration,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let frame = encode_frame(packet, max_frame)?;
    let send_op = async {
        writer.write_all(&frame).await.map_err(write_error)?;
        writer.flush().await.map_err(write_error)?;
        anyhow::Ok(())
    };
    timeout(limit, send_op)
        .await
        .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", limit))?
}

/// Read side of a TCP connection.
pub struct TcpReader {
    half: OwnedReadHalf,
    max_frame: u32,
}

/// Write side of a TCP connection.
pub struct TcpWriter {
    half: OwnedWriteHalf,
    max_frame: u32,
    send_timeout: Duration,
}

pub struct TcpTransport {
    reader: TcpReader,
    writer: TcpWriter,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, DEFAULT_SEND_TIMEOUT, MAX_FRAME_SIZE)
    }

    pub fn with_config(stream: TcpStream, send_timeout: Duration, max_frame: u32) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            log::debug!("could not disable Nagle: {}", e);
        }
        let (read, write) = stream.into_split();
        Self {
            reader: TcpReader {
                half: read,
                max_frame,
            },
            writer: TcpWriter {
                half: write,
                max_frame,
                send_timeout,
            },
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    pub fn into_halves(self) -> (TcpReader, TcpWriter) {
        (self.reader, self.writer)
    }
}

#[async_trait::async_trait]
impl Inbound for TcpReader {
    async fn recv(&mut self) -> anyhow::Result<Packet> {
        read_frame(&mut self.half, self.max_frame).await
    }
}

#[async_trait::async_trait]
impl Outbound for TcpWriter {
    async fn send(&mut self, packet: Packet) -> anyhow::Result<()> {
        write_frame(&mut self.half, &packet, self.max_frame, self.send_timeout).await
    }
}

#[async_trait::async_trait]
impl Inbound for TcpTransport {
    async fn recv(&mut self) -> anyhow::Result<Packet> {
        self.reader.recv().await
    }
}

#[async_trait::async_trait]
impl Outbound for TcpTransport {
    async fn send(&mut self, packet: Packet) -> anyhow::Result<()> {
        self.writer.send(packet).await
    }
}

impl Transport for TcpTransport {
    fn split(self: Box<Self>) -> (Box<dyn Inbound>, Box<dyn Outbound>) {
        let (reader, writer) = self.into_halves();
        (Box::new(reader), Box::new(writer))
    }
}
