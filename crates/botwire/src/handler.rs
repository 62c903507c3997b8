//! Event handler seam.

use async_trait::async_trait;
use botwire_protocol::Event;

use crate::session::WsSession;

/// Consumer of decoded inbound events.
///
/// The receive loop spawns each invocation as an independent task, in
/// frame order, so a slow handler never delays processing of the next
/// frame. The handler receives a session handle and may call back into it
/// (issue calls or fire quick operations).
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_event(&self, session: WsSession, event: Event);
}
