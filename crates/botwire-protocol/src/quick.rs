//! Quick operations: fire-and-forget reactions bound to specific event
//! variants.
//!
//! Each shape is legal against exactly one `(post_type, discriminator)`
//! bucket. The wire payload carries no tag of its own -- the enclosing
//! event determines which shape is valid -- so matching an operation to an
//! event goes through [`QuickOpKind`], the declared variant identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::segment::Message;

/// Reaction to a private message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrivateMessageQuickOp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_escape: Option<bool>,
}

/// Reaction to a group message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupMessageQuickOp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_escape: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_sender: Option<bool>,
    /// Recall the triggering message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
    /// Kick the sender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kick: Option<bool>,
    /// Ban the sender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_duration: Option<i64>,
}

/// Decision on a friend request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FriendRequestQuickOp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approve: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// Decision on a group-join request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupRequestQuickOp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approve: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A quick-operation value of any shape. Serialize-only: the payload is
/// untagged on the wire and the all-optional shapes overlap structurally,
/// so inbound decoding of one would be meaningless.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QuickOperation {
    PrivateMessage(PrivateMessageQuickOp),
    GroupMessage(GroupMessageQuickOp),
    FriendRequest(FriendRequestQuickOp),
    GroupRequest(GroupRequestQuickOp),
}

impl QuickOperation {
    /// The declared variant identity of this operation.
    pub fn kind(&self) -> QuickOpKind {
        match self {
            Self::PrivateMessage(_) => QuickOpKind::PrivateMessage,
            Self::GroupMessage(_) => QuickOpKind::GroupMessage,
            Self::FriendRequest(_) => QuickOpKind::FriendRequest,
            Self::GroupRequest(_) => QuickOpKind::GroupRequest,
        }
    }
}

impl From<PrivateMessageQuickOp> for QuickOperation {
    fn from(op: PrivateMessageQuickOp) -> Self {
        Self::PrivateMessage(op)
    }
}

impl From<GroupMessageQuickOp> for QuickOperation {
    fn from(op: GroupMessageQuickOp) -> Self {
        Self::GroupMessage(op)
    }
}

impl From<FriendRequestQuickOp> for QuickOperation {
    fn from(op: FriendRequestQuickOp) -> Self {
        Self::FriendRequest(op)
    }
}

impl From<GroupRequestQuickOp> for QuickOperation {
    fn from(op: GroupRequestQuickOp) -> Self {
        Self::GroupRequest(op)
    }
}

/// Declared identity of a quick-operation shape. Pairing an operation with
/// an event compares these tags; structural field compatibility between
/// shapes never counts as a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickOpKind {
    PrivateMessage,
    GroupMessage,
    FriendRequest,
    GroupRequest,
}

impl fmt::Display for QuickOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PrivateMessage => "private message reaction",
            Self::GroupMessage => "group message reaction",
            Self::FriendRequest => "friend request decision",
            Self::GroupRequest => "group request decision",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;

    #[test]
    fn test_quick_operation_serializes_untagged() {
        let op = QuickOperation::GroupMessage(GroupMessageQuickOp {
            reply: Some(vec![Segment::text("ok")]),
            at_sender: Some(true),
            ..Default::default()
        });
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains(r#""at_sender":true"#));
        assert!(!json.contains("GroupMessage"));
        assert!(!json.contains("kick"));
    }

    #[test]
    fn test_kind_tracks_variant() {
        let op: QuickOperation = FriendRequestQuickOp {
            approve: Some(true),
            ..Default::default()
        }
        .into();
        assert_eq!(op.kind(), QuickOpKind::FriendRequest);
    }
}
