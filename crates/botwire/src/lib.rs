//! Typed websocket client session for botwire chat-bot communication.
//!
//! One [`WsSession`] owns one physical connection:
//!
//! ```text
//! caller ----call(action)----> WsSession ----envelope----> server
//!                                  |
//!                          receive loop (run)
//!                          /               \
//!                   responses            events
//!                (resolve pending)   (EventHandler tasks)
//! ```
//!
//! A single receive loop, entered via [`WsSession::run`], reads every
//! inbound frame: call responses resolve their originating
//! [`WsSession::call`] by correlation id, and decoded events are fanned
//! out to the injected [`EventHandler`] without ever blocking the loop.
//! Handlers can react to a specific event with
//! [`WsSession::fire_quick_operation`], which sends without awaiting
//! anything.
//!
//! Schema knowledge lives in [`botwire_protocol`], re-exported here as
//! [`protocol`]; sessions borrow a [`ProtocolRegistry`](botwire_protocol::ProtocolRegistry)
//! assembled at startup (usually `ProtocolRegistry::onebot_v11()`).

pub mod endpoint;
pub mod error;
pub mod handler;
pub mod session;
pub mod transport;

pub use endpoint::WsEndpoint;
pub use error::{ApiError, SessionError, TransportError};
pub use handler::EventHandler;
pub use session::WsSession;

pub use botwire_protocol as protocol;
