//! Message events: something said in a private chat or a group.

use serde::{Deserialize, Serialize};

use crate::segment::Message;

/// Message events, discriminated by `message_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum MessageEvent {
    Private(PrivateMessageEvent),
    Group(GroupMessageEvent),
}

impl MessageEvent {
    /// Wire value of the `message_type` discriminator.
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::Private(_) => "private",
            Self::Group(_) => "group",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateMessageEvent {
    pub time: i64,
    pub self_id: i64,
    pub sub_type: PrivateMessageSubType,
    pub message_id: i64,
    pub user_id: i64,
    pub message: Message,
    pub raw_message: String,
    pub font: i64,
    pub sender: PrivateSender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivateMessageSubType {
    Friend,
    Group,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMessageEvent {
    pub time: i64,
    pub self_id: i64,
    pub sub_type: GroupMessageSubType,
    pub message_id: i64,
    pub group_id: i64,
    pub user_id: i64,
    /// Present when the sender posted anonymously.
    #[serde(default)]
    pub anonymous: Option<Anonymous>,
    pub message: Message,
    pub raw_message: String,
    pub font: i64,
    pub sender: GroupSender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMessageSubType {
    Normal,
    Anonymous,
    Notice,
}

/// Identity of an anonymous group sender. The `flag` is the opaque handle
/// required to act on the sender (e.g. an anonymous ban).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anonymous {
    pub id: i64,
    pub name: String,
    pub flag: String,
}

/// Sender info attached to private messages. Every field is best-effort;
/// the server omits what it does not know.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrivateSender {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
}

/// Sender info attached to group messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupSender {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<GroupRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Owner,
    Admin,
    Member,
}
