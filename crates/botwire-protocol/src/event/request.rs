//! Request events: friend and group-join requests awaiting a decision.

use serde::{Deserialize, Serialize};

/// Request events, discriminated by `request_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "request_type", rename_all = "snake_case")]
pub enum RequestEvent {
    Friend(FriendRequestEvent),
    Group(GroupRequestEvent),
}

impl RequestEvent {
    /// Wire value of the `request_type` discriminator.
    pub fn request_type(&self) -> &'static str {
        match self {
            Self::Friend(_) => "friend",
            Self::Group(_) => "group",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequestEvent {
    pub time: i64,
    pub self_id: i64,
    pub user_id: i64,
    pub comment: String,
    /// Opaque handle to pass back when approving or rejecting.
    pub flag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRequestEvent {
    pub time: i64,
    pub self_id: i64,
    pub sub_type: GroupRequestSubType,
    pub group_id: i64,
    pub user_id: i64,
    pub comment: String,
    /// Opaque handle to pass back when approving or rejecting.
    pub flag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRequestSubType {
    Add,
    Invite,
}
