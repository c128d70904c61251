//! Message transport seen by a session.
//!
//! A [`Transport`] is a bidirectional, ordered message stream. The session
//! owns it exclusively, so there is never more than one pending receive or
//! send at a time.

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use humora_analyzer::BoxFuture;
use tracing::trace;

use crate::error::{TransportError, TransportResult};

/// A data message carried by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireMessage {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Binary(Bytes),
}

impl WireMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Returns the text content, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }
}

/// Bidirectional message stream owned by one session.
pub trait Transport: Send {
    /// Waits for the next data message.
    ///
    /// Returns `Ok(None)` when the peer closed the stream cleanly, and an
    /// error for any other way the stream can end.
    fn recv(&mut self) -> BoxFuture<'_, TransportResult<Option<WireMessage>>>;

    /// Sends one message and waits until it is written.
    fn send(&mut self, message: WireMessage) -> BoxFuture<'_, TransportResult<()>>;

    /// Starts a clean close from this side.
    fn close(&mut self) -> BoxFuture<'_, TransportResult<()>>;

    /// Returns true once the stream has ended in either direction.
    fn is_closed(&self) -> bool;
}

/// [`Transport`] over an axum WebSocket.
///
/// WebSocket ping/pong frames are answered by the protocol layer and never
/// reach the session.
pub struct WsTransport {
    socket: WebSocket,
    closed: bool,
}

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self {
            socket,
            closed: false,
        }
    }
}

impl Transport for WsTransport {
    fn recv(&mut self) -> BoxFuture<'_, TransportResult<Option<WireMessage>>> {
        Box::pin(async move {
            if self.closed {
                return Ok(None);
            }

            loop {
                match self.socket.recv().await {
                    None | Some(Ok(Message::Close(_))) => {
                        self.closed = true;
                        return Ok(None);
                    }
                    Some(Err(e)) => {
                        self.closed = true;
                        return Err(TransportError::receive(e));
                    }
                    Some(Ok(Message::Text(text))) => {
                        return Ok(Some(WireMessage::Text(text.as_str().to_owned())));
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        return Ok(Some(WireMessage::Binary(bytes)));
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        trace!("WebSocket control frame");
                    }
                }
            }
        })
    }

    fn send(&mut self, message: WireMessage) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            if self.closed {
                return Err(TransportError::Closed);
            }

            let message = match message {
                WireMessage::Text(text) => Message::Text(text.into()),
                WireMessage::Binary(bytes) => Message::Binary(bytes),
            };

            if let Err(e) = self.socket.send(message).await {
                self.closed = true;
                return Err(TransportError::send(e));
            }
            Ok(())
        })
    }

    fn close(&mut self) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            if self.closed {
                return Ok(());
            }
            self.closed = true;
            self.socket
                .send(Message::Close(None))
                .await
                .map_err(TransportError::send)
        })
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
