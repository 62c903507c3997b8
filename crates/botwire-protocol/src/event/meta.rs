//! Meta events: connection lifecycle and heartbeats from the server itself.

use serde::{Deserialize, Serialize};

use crate::api::Status;

/// Meta events, discriminated by `meta_event_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "meta_event_type", rename_all = "snake_case")]
pub enum MetaEvent {
    Lifecycle(LifecycleEvent),
    Heartbeat(HeartbeatEvent),
}

impl MetaEvent {
    /// Wire value of the `meta_event_type` discriminator.
    pub fn meta_event_type(&self) -> &'static str {
        match self {
            Self::Lifecycle(_) => "lifecycle",
            Self::Heartbeat(_) => "heartbeat",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub time: i64,
    pub self_id: i64,
    pub sub_type: LifecycleSubType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleSubType {
    Enable,
    Disable,
    Connect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatEvent {
    pub time: i64,
    pub self_id: i64,
    pub status: Status,
    /// Milliseconds until the next heartbeat.
    pub interval: i64,
}
