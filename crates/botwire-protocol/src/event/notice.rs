//! Notice events: state changes observed by the bot account.

use serde::{Deserialize, Serialize};

/// Notice events, discriminated by `notice_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "notice_type", rename_all = "snake_case")]
pub enum NoticeEvent {
    GroupUpload(GroupUploadNotice),
    GroupAdmin(GroupAdminNotice),
    GroupDecrease(GroupDecreaseNotice),
    GroupIncrease(GroupIncreaseNotice),
    GroupBan(GroupBanNotice),
    FriendAdd(FriendAddNotice),
    GroupRecall(GroupRecallNotice),
    FriendRecall(FriendRecallNotice),
    Notify(NotifyNotice),
}

impl NoticeEvent {
    /// Wire value of the `notice_type` discriminator.
    pub fn notice_type(&self) -> &'static str {
        match self {
            Self::GroupUpload(_) => "group_upload",
            Self::GroupAdmin(_) => "group_admin",
            Self::GroupDecrease(_) => "group_decrease",
            Self::GroupIncrease(_) => "group_increase",
            Self::GroupBan(_) => "group_ban",
            Self::FriendAdd(_) => "friend_add",
            Self::GroupRecall(_) => "group_recall",
            Self::FriendRecall(_) => "friend_recall",
            Self::Notify(_) => "notify",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupUploadNotice {
    pub time: i64,
    pub self_id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub file: FileInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: String,
    pub name: String,
    pub size: i64,
    pub busid: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAdminNotice {
    pub time: i64,
    pub self_id: i64,
    pub sub_type: GroupAdminSubType,
    pub group_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupAdminSubType {
    Set,
    Unset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDecreaseNotice {
    pub time: i64,
    pub self_id: i64,
    pub sub_type: GroupDecreaseSubType,
    pub group_id: i64,
    pub operator_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupDecreaseSubType {
    Leave,
    Kick,
    KickMe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupIncreaseNotice {
    pub time: i64,
    pub self_id: i64,
    pub sub_type: GroupIncreaseSubType,
    pub group_id: i64,
    pub operator_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupIncreaseSubType {
    Approve,
    Invite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupBanNotice {
    pub time: i64,
    pub self_id: i64,
    pub sub_type: GroupBanSubType,
    pub group_id: i64,
    pub operator_id: i64,
    pub user_id: i64,
    /// Ban length in seconds; 0 on a lift.
    pub duration: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBanSubType {
    Ban,
    LiftBan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendAddNotice {
    pub time: i64,
    pub self_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecallNotice {
    pub time: i64,
    pub self_id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub operator_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRecallNotice {
    pub time: i64,
    pub self_id: i64,
    pub user_id: i64,
    pub message_id: i64,
}

/// `notify` notices, further discriminated by `sub_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "sub_type", rename_all = "snake_case")]
pub enum NotifyNotice {
    Poke(PokeNotify),
    LuckyKing(LuckyKingNotify),
    Honor(HonorNotify),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokeNotify {
    pub time: i64,
    pub self_id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub target_id: i64,
}

/// Red-packet luck king announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuckyKingNotify {
    pub time: i64,
    pub self_id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub target_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HonorNotify {
    pub time: i64,
    pub self_id: i64,
    pub group_id: i64,
    pub honor_type: HonorKind,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HonorKind {
    Talkative,
    Performer,
    Emotion,
}
