use stratego::protocol::{Packet, PROTOCOL_VERSION};
use stratego::transport::tcp::{encode_frame, TcpTransport, MAX_FRAME_SIZE};
use stratego::transport::{Inbound, Outbound};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::Duration;

async fn serve_bytes(bytes: Vec<u8>) -> anyhow::Result<(TcpTransport, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(&bytes).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    });
    let transport = TcpTransport::connect(addr).await?;
    Ok((transport, server))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_oversized_length_prefix() -> anyhow::Result<()> {
    let (mut transport, server) = serve_bytes(vec![0xFF, 0xFF, 0xFF, 0xFF]).await?;
    let err = transport.recv().await.unwrap_err().to_string();
    assert!(err.contains("too large"), "unexpected error: {}", err);
    server.await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_zero_length_frame() -> anyhow::Result<()> {
    let (mut transport, server) = serve_bytes(vec![0, 0, 0, 0]).await?;
    assert!(transport.recv().await.is_err());
    server.await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_truncated_frame() -> anyhow::Result<()> {
    let mut bytes = 100u32.to_be_bytes().to_vec();
    bytes.extend_from_slice(&[0u8; 10]);
    let (mut transport, server) = serve_bytes(bytes).await?;
    server.await?;
    let err = transport.recv().await.unwrap_err().to_string();
    assert!(err.contains("closed"), "unexpected error: {}", err);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_garbage_payload() -> anyhow::Result<()> {
    let mut bytes = 4u32.to_be_bytes().to_vec();
    bytes.extend_from_slice(&[0xAB, 0xCD, 0xEF, 0x99]);
    let (mut transport, server) = serve_bytes(bytes).await?;
    let err = transport.recv().await.unwrap_err().to_string();
    assert!(err.contains("Deserialization"), "unexpected error: {}", err);
    server.await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_valid_frame_after_raw_write() -> anyhow::Result<()> {
    let packet = Packet::Handshake {
        version: PROTOCOL_VERSION,
    };
    let (mut transport, server) = serve_bytes(encode_frame(&packet, MAX_FRAME_SIZE)?).await?;
    assert_eq!(transport.recv().await?, packet);
    server.await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_to_closed_peer_fails() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        drop(socket);
    });
    let mut transport = TcpTransport::connect(addr).await?;
    server.await?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let packet = Packet::Handshake {
        version: PROTOCOL_VERSION,
    };
    // The first write may still be buffered by the kernel; keep going until the reset shows.
    let mut failed = false;
    for _ in 0..50 {
        if transport.send(packet).await.is_err() {
            failed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(failed);
    Ok(())
}
