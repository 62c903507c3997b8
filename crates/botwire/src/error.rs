//! Session and transport error types.

use botwire_protocol::wire::RawApiResponse;
use botwire_protocol::{DecodeError, RegistryError};
use thiserror::Error;

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Websocket-level failure (handshake, protocol, or socket).
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The endpoint URL or credential cannot form a valid handshake
    /// request.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The connection is closed.
    #[error("transport is closed")]
    Closed,
}

/// Failures surfaced to an individual caller of
/// [`WsSession::call`](crate::WsSession::call) or
/// [`WsSession::fire_quick_operation`](crate::WsSession::fire_quick_operation).
///
/// None of these affect other in-flight calls or the receive loop.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The receive loop is not running, so a response could never be
    /// observed. Calling would hang forever; failing fast is deliberate.
    #[error("session is not listening; start the receive loop before calling")]
    NotListening,

    /// The session disconnected before the call could complete.
    #[error("connection closed while action \"{0}\" was in flight")]
    ConnectionClosed(String),

    /// The server answered with a retcode from the bad-status set. The raw
    /// response is attached for inspection.
    #[error("action \"{action}\" (echo {echo}) failed with retcode {}", .response.retcode)]
    BadStatus {
        action: String,
        echo: u64,
        response: RawApiResponse,
    },

    /// Registry lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The response data or the event/operation pairing failed typed
    /// decoding.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The params or envelope failed to serialize.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failures of the session itself rather than of one call.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The receive loop was entered a second time.
    #[error("receive loop is already running (or has already finished)")]
    AlreadyReceiving,
}
