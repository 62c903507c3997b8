//! Shared test helpers: an in-memory transport and trivial handlers.

use async_trait::async_trait;
use botwire::error::TransportError;
use botwire::transport::{Transport, TransportSink, TransportStream};
use botwire::{EventHandler, WsSession};
use botwire_protocol::Event;
use tokio::sync::mpsc;

/// Transport backed by channels. The paired [`MemRemote`] plays the server:
/// it observes outbound frames and injects inbound ones.
pub struct MemTransport {
    outbound_tx: mpsc::UnboundedSender<String>,
    inbound_rx: mpsc::UnboundedReceiver<String>,
}

/// Server side of a [`MemTransport`]. Dropping `inbound` closes the
/// connection from the server's end.
pub struct MemRemote {
    pub outbound: mpsc::UnboundedReceiver<String>,
    pub inbound: mpsc::UnboundedSender<String>,
}

pub fn mem_transport() -> (MemTransport, MemRemote) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    (
        MemTransport {
            outbound_tx,
            inbound_rx,
        },
        MemRemote {
            outbound: outbound_rx,
            inbound: inbound_tx,
        },
    )
}

impl Transport for MemTransport {
    fn into_split(self: Box<Self>) -> (Box<dyn TransportSink>, Box<dyn TransportStream>) {
        (
            Box::new(MemSink {
                tx: Some(self.outbound_tx),
            }),
            Box::new(MemStream {
                rx: self.inbound_rx,
            }),
        )
    }
}

struct MemSink {
    tx: Option<mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl TransportSink for MemSink {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        let Some(tx) = &self.tx else {
            return Err(TransportError::Closed);
        };
        tx.send(text).map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.tx = None;
        Ok(())
    }
}

struct MemStream {
    rx: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl TransportStream for MemStream {
    async fn receive(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.rx.recv().await)
    }
}

/// Handler that ignores every event.
pub struct NullHandler;

#[async_trait]
impl EventHandler for NullHandler {
    async fn on_event(&self, _session: WsSession, _event: Event) {}
}

/// Handler that forwards every event to a channel for the test to inspect.
pub struct ChannelHandler {
    pub tx: mpsc::UnboundedSender<Event>,
}

#[async_trait]
impl EventHandler for ChannelHandler {
    async fn on_event(&self, _session: WsSession, event: Event) {
        let _ = self.tx.send(event);
    }
}
