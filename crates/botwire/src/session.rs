//! The websocket session: one physical connection, one receive loop,
//! concurrent typed calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use dashmap::DashMap;
use log::{debug, warn};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use botwire_protocol::api::{ApiAction, HandleQuickOperation};
use botwire_protocol::decode;
use botwire_protocol::wire::{CallEnvelope, RawApiResponse};
use botwire_protocol::{DecodeError, Event, ProtocolRegistry, QuickOperation};

use crate::endpoint::WsEndpoint;
use crate::error::{ApiError, SessionError};
use crate::handler::EventHandler;
use crate::transport::{Transport, TransportSink, TransportStream, WsTransport};

/// Buffer size for the outbound write channel.
const WRITE_BUFFER_SIZE: usize = 64;

const STATE_CONNECTED: u8 = 0;
const STATE_RECEIVING: u8 = 1;
const STATE_DISCONNECTED: u8 = 2;

enum WriteCommand {
    Send(String),
    Close,
}

/// A typed client session over one websocket connection.
///
/// Any number of tasks may hold clones of the session and issue
/// [`call`](Self::call)s concurrently; the single receive loop entered via
/// [`run`](Self::run) pairs every response with its originating call by
/// correlation id and fans decoded events out to the injected
/// [`EventHandler`].
///
/// The session never reconnects. After a transport failure or
/// [`disconnect`](Self::disconnect) it is spent; create a new session to
/// talk again.
#[derive(Clone)]
pub struct WsSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    registry: Arc<ProtocolRegistry>,
    write_tx: mpsc::Sender<WriteCommand>,
    /// In-flight calls, keyed by echo. Inserted by the send path, removed
    /// by the receive loop (response), teardown (drain) or the drop guard
    /// (caller cancellation).
    pending: DashMap<u64, oneshot::Sender<RawApiResponse>>,
    next_echo: AtomicU64,
    state: AtomicU8,
    stream: std::sync::Mutex<Option<Box<dyn TransportStream>>>,
}

impl WsSession {
    /// Connect to an endpoint. The session starts out connected but not
    /// yet listening; enter [`run`](Self::run) to start observing frames.
    pub async fn connect(
        endpoint: &WsEndpoint,
        registry: Arc<ProtocolRegistry>,
    ) -> Result<Self, SessionError> {
        let transport = WsTransport::connect(endpoint).await?;
        Ok(Self::from_transport(Box::new(transport), registry))
    }

    /// Build a session over an already-established transport.
    pub fn from_transport(transport: Box<dyn Transport>, registry: Arc<ProtocolRegistry>) -> Self {
        let (sink, stream) = transport.into_split();
        let (write_tx, write_rx) = mpsc::channel(WRITE_BUFFER_SIZE);
        tokio::spawn(writer_task(sink, write_rx));
        Self {
            inner: Arc::new(SessionInner {
                registry,
                write_tx,
                pending: DashMap::new(),
                next_echo: AtomicU64::new(0),
                state: AtomicU8::new(STATE_CONNECTED),
                stream: std::sync::Mutex::new(Some(stream)),
            }),
        }
    }

    /// Whether the receive loop is currently running.
    pub fn is_receiving(&self) -> bool {
        self.inner.state.load(Ordering::SeqCst) == STATE_RECEIVING
    }

    /// Run the receive loop until the transport closes or fails.
    ///
    /// This is the sole reader of the connection and the only place
    /// pending calls get resolved, so it must be running for any
    /// [`call`](Self::call) to complete. Entered once per session.
    ///
    /// Frames are classified by the presence of a top-level `self_id`
    /// field: events carry one, responses carry `echo` instead. A response
    /// that happened to include a `self_id` of its own would be
    /// misclassified as an event; the wire protocol does not produce such
    /// responses today, but the heuristic is inherited from it.
    pub async fn run(&self, handler: Arc<dyn EventHandler>) -> Result<(), SessionError> {
        let mut stream = {
            let mut slot = self.inner.stream.lock().expect("stream mutex poisoned");
            slot.take().ok_or(SessionError::AlreadyReceiving)?
        };

        if self
            .inner
            .state
            .compare_exchange(
                STATE_CONNECTED,
                STATE_RECEIVING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            // Disconnected before the loop ever started.
            return Ok(());
        }

        let result = loop {
            match stream.receive().await {
                Ok(Some(text)) => self.handle_frame(&text, &handler),
                Ok(None) => break Ok(()),
                Err(e) => break Err(SessionError::Transport(e)),
            }
        };

        self.teardown();
        result
    }

    /// Classify and process one inbound frame. Never fails: a bad frame is
    /// logged and dropped so the loop keeps serving the connection.
    fn handle_frame(&self, text: &str, handler: &Arc<dyn EventHandler>) {
        let value: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                warn!("Discarding malformed frame: {e}");
                return;
            }
        };

        if value.get("self_id").is_some() {
            match decode::decode_event(&self.inner.registry, &value) {
                Ok(event) => {
                    debug!(
                        "Dispatching ({}, {}) event",
                        event.post_type(),
                        event.discriminator_value()
                    );
                    let session = self.clone();
                    let handler = Arc::clone(handler);
                    tokio::spawn(async move {
                        handler.on_event(session, event).await;
                    });
                }
                Err(e) => warn!("Discarding undecodable event frame: {e}"),
            }
            return;
        }

        let response: RawApiResponse = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!("Discarding frame that is neither event nor response: {e}");
                return;
            }
        };
        let echo: u64 = match response.echo.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!("Discarding response with unparseable echo {:?}", response.echo);
                return;
            }
        };
        match self.inner.pending.remove(&echo) {
            Some((_, tx)) => {
                // A send failure means the caller was cancelled after the
                // response arrived; nothing left to do.
                let _ = tx.send(response);
            }
            None => warn!("Received response for unknown echo {echo}"),
        }
    }

    /// Issue a typed call and await its correlated response.
    ///
    /// The pending entry is inserted before the envelope is written, so a
    /// response can never arrive ahead of its table entry. Dropping the
    /// returned future before it resolves removes the entry again.
    pub async fn call<A>(&self, params: A) -> Result<A::Response, ApiError>
    where
        A: ApiAction + 'static,
    {
        match self.inner.state.load(Ordering::SeqCst) {
            STATE_RECEIVING => {}
            STATE_DISCONNECTED => return Err(ApiError::ConnectionClosed(A::NAME.to_string())),
            _ => return Err(ApiError::NotListening),
        }

        let entry = self.inner.registry.lookup_action(A::NAME)?;
        let echo = self.inner.next_echo.fetch_add(1, Ordering::SeqCst);

        let json = serde_json::to_string(&CallEnvelope {
            action: A::NAME,
            params,
            echo: Some(echo.to_string()),
        })
        .map_err(ApiError::Encode)?;

        let (tx, rx) = oneshot::channel();
        self.inner.pending.insert(echo, tx);
        let _guard = PendingGuard {
            inner: Arc::clone(&self.inner),
            echo,
        };

        if self
            .inner
            .write_tx
            .send(WriteCommand::Send(json))
            .await
            .is_err()
        {
            return Err(ApiError::ConnectionClosed(A::NAME.to_string()));
        }

        let response = match rx.await {
            Ok(response) => response,
            // Sender dropped: the session tore down and drained the table.
            Err(_) => return Err(ApiError::ConnectionClosed(A::NAME.to_string())),
        };

        if response.is_bad_status() {
            return Err(ApiError::BadStatus {
                action: A::NAME.to_string(),
                echo,
                response,
            });
        }

        let decoded = entry.decode_response(response.data)?;
        let typed = decoded
            .downcast::<A::Response>()
            .map_err(|_| DecodeError::ResponseShapeConflict(A::NAME.to_string()))?;
        Ok(*typed)
    }

    /// Send a fire-and-forget reaction to a received event.
    ///
    /// The operation must declare the exact variant bound to the event's
    /// bucket. No correlation id is assigned, no pending entry is created,
    /// and the method returns as soon as the envelope is handed to the
    /// writer -- there is no acknowledgement to wait for.
    pub async fn fire_quick_operation(
        &self,
        event: &Event,
        operation: QuickOperation,
    ) -> Result<(), ApiError> {
        if self.inner.state.load(Ordering::SeqCst) == STATE_DISCONNECTED {
            return Err(ApiError::ConnectionClosed(
                HandleQuickOperation::NAME.to_string(),
            ));
        }

        decode::check_quick_operation(&self.inner.registry, event, &operation)?;

        let json = serde_json::to_string(&CallEnvelope {
            action: HandleQuickOperation::NAME,
            params: HandleQuickOperation {
                context: event.clone(),
                operation,
            },
            echo: None,
        })
        .map_err(ApiError::Encode)?;

        self.inner
            .write_tx
            .send(WriteCommand::Send(json))
            .await
            .map_err(|_| ApiError::ConnectionClosed(HandleQuickOperation::NAME.to_string()))
    }

    /// Close the connection. Every call still in flight resolves with a
    /// connection-closed error rather than waiting forever.
    pub async fn disconnect(&self) {
        // The writer may already be gone if the transport failed first.
        let _ = self.inner.write_tx.send(WriteCommand::Close).await;
        self.teardown();
    }

    fn teardown(&self) {
        self.inner.state.store(STATE_DISCONNECTED, Ordering::SeqCst);
        let drained = self.inner.pending.len();
        if drained > 0 {
            debug!("Resolving {drained} pending calls as connection-closed");
        }
        // Dropping the senders resolves every waiting caller with a
        // connection-closed error.
        self.inner.pending.clear();
    }
}

/// Removes a call's pending entry if its future is dropped before the
/// response lands; a cancelled call must not leak a table entry whose
/// sender nobody will ever observe.
struct PendingGuard {
    inner: Arc<SessionInner>,
    echo: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.inner.pending.remove(&self.echo);
    }
}

async fn writer_task(mut sink: Box<dyn TransportSink>, mut rx: mpsc::Receiver<WriteCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Send(text) => {
                // Truncate for logging, respecting char boundaries.
                let display: String = text.chars().take(200).collect();
                debug!("Sending frame: {display}");
                if let Err(e) = sink.send(text).await {
                    warn!("Failed to write frame: {e}");
                    break;
                }
            }
            WriteCommand::Close => {
                if let Err(e) = sink.close().await {
                    debug!("Error closing transport: {e}");
                }
                break;
            }
        }
    }
    debug!("Writer task ended");
}
