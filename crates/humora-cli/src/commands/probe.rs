//! Smoke test against a running server.
//!
//! Connects as a frontend would, checks that `ping` is answered, then sends
//! frames and prints every reply line as it arrives.

use std::path::Path;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use humora_core::DecodedFrame;
use humora_protocol::{PING, PONG, encode_data_uri, encode_jpeg};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use crate::cli::ProbeArgs;
use crate::error::{CliError, CliResult};

type Peer = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CARD_WIDTH: u32 = 64;
const CARD_HEIGHT: u32 = 48;
/// Quality the frontend uses for canvas snapshots.
const CARD_QUALITY: u8 = 70;

/// Runs the probe and prints replies to stdout.
pub async fn run(args: &ProbeArgs) -> CliResult<()> {
    let timeout = Duration::from_secs(args.timeout);
    let payload = match &args.image {
        Some(path) => image_payload(path)?,
        None => test_card_payload()?,
    };

    let (mut peer, _) = tokio::time::timeout(timeout, connect_async(args.url.as_str()))
        .await
        .map_err(|_| CliError::Timeout(format!("connecting to {}", args.url)))??;
    debug!(url = %args.url, "Connected");

    peer.send(Message::text(PING.to_string())).await?;
    let reply = next_text(&mut peer, timeout).await?;
    if reply != PONG {
        return Err(CliError::Protocol(format!(
            "expected {PONG} in reply to {PING}, got: {reply}"
        )));
    }
    println!("{reply}");

    for frame in 1..=args.count {
        let started = Instant::now();
        peer.send(Message::text(payload.clone())).await?;
        let reply = next_text(&mut peer, timeout).await?;
        debug!(frame, elapsed_ms = started.elapsed().as_millis() as u64, "Reply");
        println!("{reply}");
    }

    peer.close(None).await?;
    Ok(())
}

/// Reads an image file into a `data:` URI payload.
pub fn image_payload(path: &Path) -> CliResult<String> {
    let bytes = std::fs::read(path)?;
    let format = image::guess_format(&bytes).map_err(|e| {
        CliError::Protocol(format!("{} is not a supported image: {}", path.display(), e))
    })?;
    Ok(encode_data_uri(format.to_mime_type(), &bytes))
}

/// A generated gradient, JPEG encoded like a browser frame.
pub fn test_card_payload() -> CliResult<String> {
    let mut pixels = Vec::with_capacity((CARD_WIDTH * CARD_HEIGHT * 3) as usize);
    for y in 0..CARD_HEIGHT {
        for x in 0..CARD_WIDTH {
            pixels.extend_from_slice(&[(x * 4) as u8, (y * 5) as u8, 128]);
        }
    }
    let frame = DecodedFrame::new(CARD_WIDTH, CARD_HEIGHT, pixels)
        .map_err(|e| CliError::Protocol(e.to_string()))?;
    Ok(encode_data_uri("image/jpeg", &encode_jpeg(&frame, CARD_QUALITY)?))
}

/// Next text message, skipping WebSocket control frames.
async fn next_text(peer: &mut Peer, timeout: Duration) -> CliResult<String> {
    loop {
        let message = tokio::time::timeout(timeout, peer.next()).await.map_err(|_| {
            CliError::Timeout(format!(
                "no reply within {}s (the server skips frames it cannot decode)",
                timeout.as_secs()
            ))
        })?;

        match message {
            None => return Err(CliError::Connection("connection ended".into())),
            Some(Err(e)) => return Err(e.into()),
            Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
            Some(Ok(Message::Close(_))) => {
                return Err(CliError::Connection("server closed the connection".into()));
            }
            Some(Ok(other)) => debug!(?other, "Ignoring non-text message"),
        }
    }
}
