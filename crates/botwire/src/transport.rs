//! Duplex message transport.
//!
//! The session talks to the wire through a pair of trait objects: the sink
//! half accepts outbound text and close, the stream half yields inbound
//! text. The split matches how the session runs -- a writer task owns the
//! sink while the receive loop owns the stream -- and lets tests substitute
//! an in-memory transport.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::endpoint::WsEndpoint;
use crate::error::TransportError;

/// Outbound half of a transport.
#[async_trait]
pub trait TransportSink: Send {
    async fn send(&mut self, text: String) -> Result<(), TransportError>;
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Inbound half of a transport. `receive` suspends until a frame is
/// available and yields `None` once the peer closes cleanly.
#[async_trait]
pub trait TransportStream: Send {
    async fn receive(&mut self) -> Result<Option<String>, TransportError>;
}

/// A connected duplex transport, consumed by splitting into halves.
pub trait Transport: Send {
    fn into_split(self: Box<Self>) -> (Box<dyn TransportSink>, Box<dyn TransportStream>);
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Websocket transport over tokio-tungstenite.
pub struct WsTransport {
    inner: WsStream,
}

impl WsTransport {
    /// Connect to the endpoint, attaching the bearer credential when one
    /// is configured.
    pub async fn connect(endpoint: &WsEndpoint) -> Result<Self, TransportError> {
        let mut request = endpoint
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::InvalidEndpoint(e.to_string()))?;

        if let Some(token) = &endpoint.access_token {
            let value = format!("Bearer {token}").parse().map_err(|_| {
                TransportError::InvalidEndpoint(
                    "access token is not a valid header value".to_string(),
                )
            })?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (inner, _) = connect_async(request).await?;
        Ok(Self { inner })
    }
}

impl Transport for WsTransport {
    fn into_split(self: Box<Self>) -> (Box<dyn TransportSink>, Box<dyn TransportStream>) {
        let (sink, stream) = self.inner.split();
        (
            Box::new(WsSinkHalf { inner: sink }),
            Box::new(WsStreamHalf { inner: stream }),
        )
    }
}

struct WsSinkHalf {
    inner: SplitSink<WsStream, WsMessage>,
}

#[async_trait]
impl TransportSink for WsSinkHalf {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.inner.send(WsMessage::Text(text.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.inner.close().await?;
        Ok(())
    }
}

struct WsStreamHalf {
    inner: SplitStream<WsStream>,
}

#[async_trait]
impl TransportStream for WsStreamHalf {
    async fn receive(&mut self) -> Result<Option<String>, TransportError> {
        while let Some(message) = self.inner.next().await {
            match message? {
                WsMessage::Text(text) => return Ok(Some(text.to_string())),
                WsMessage::Binary(_) | WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
                WsMessage::Close(_) => return Ok(None),
                WsMessage::Frame(_) => continue,
            }
        }
        Ok(None)
    }
}
