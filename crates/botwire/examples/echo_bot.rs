//! Minimal echo bot: replies to private messages with the same text.
//!
//! ```text
//! cargo run --example echo_bot -- ws://127.0.0.1:6700
//! ```
//!
//! Set `BOTWIRE_ACCESS_TOKEN` to authenticate against servers that
//! require a bearer credential.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use botwire::{EventHandler, WsEndpoint, WsSession};
use botwire_protocol::event::MessageEvent;
use botwire_protocol::quick::PrivateMessageQuickOp;
use botwire_protocol::{Event, ProtocolRegistry, Segment};
use log::{info, warn};

struct EchoHandler;

#[async_trait]
impl EventHandler for EchoHandler {
    async fn on_event(&self, session: WsSession, event: Event) {
        if let Event::Message(MessageEvent::Private(msg)) = &event {
            info!("{}: {}", msg.user_id, msg.raw_message);
            let reply = PrivateMessageQuickOp {
                reply: Some(vec![Segment::text(msg.raw_message.clone())]),
                ..Default::default()
            };
            if let Err(e) = session.fire_quick_operation(&event, reply.into()).await {
                warn!("echo failed: {e}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:6700".to_string());
    let mut endpoint = WsEndpoint::new(url);
    if let Ok(token) = std::env::var("BOTWIRE_ACCESS_TOKEN") {
        endpoint = endpoint.with_access_token(token);
    }

    let registry = Arc::new(ProtocolRegistry::onebot_v11());
    let session = WsSession::connect(&endpoint, registry).await?;

    info!("connected to {}", endpoint.url);
    session.run(Arc::new(EchoHandler)).await?;
    Ok(())
}
