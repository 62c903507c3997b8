//! The action catalogue: typed params and response shapes for every remote
//! action the protocol exposes.
//!
//! Each params struct implements [`ApiAction`], which binds it to its wire
//! name and the typed shape of the response `data`. Actions that return no
//! data use `()`, which decodes from the `null` the server sends back.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::event::{Anonymous, Event, GroupRequestSubType, GroupRole, GroupSender, PrivateSender, Sex};
use crate::quick::QuickOperation;
use crate::segment::Message;

/// A named remote action. The implementing type is the params payload;
/// `NAME` is the wire action name and `Response` the typed shape of the
/// response `data`.
pub trait ApiAction: Serialize + Send {
    const NAME: &'static str;
    type Response: DeserializeOwned + Send + 'static;
}

// ============================================================================
// Messaging
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SendPrivateMsg {
    pub user_id: i64,
    pub message: Message,
    /// Send the content as literal text instead of parsing markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_escape: Option<bool>,
}

impl ApiAction for SendPrivateMsg {
    const NAME: &'static str = "send_private_msg";
    type Response = MessageIdResponse;
}

#[derive(Debug, Clone, Serialize)]
pub struct SendGroupMsg {
    pub group_id: i64,
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_escape: Option<bool>,
}

impl ApiAction for SendGroupMsg {
    const NAME: &'static str = "send_group_msg";
    type Response = MessageIdResponse;
}

/// Target-generic send, discriminated by `message_type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum SendMsg {
    Private {
        user_id: i64,
        message: Message,
        #[serde(skip_serializing_if = "Option::is_none")]
        auto_escape: Option<bool>,
    },
    Group {
        group_id: i64,
        message: Message,
        #[serde(skip_serializing_if = "Option::is_none")]
        auto_escape: Option<bool>,
    },
}

impl ApiAction for SendMsg {
    const NAME: &'static str = "send_msg";
    type Response = MessageIdResponse;
}

/// Response of the message-sending actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageIdResponse {
    pub message_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteMsg {
    pub message_id: i64,
}

impl ApiAction for DeleteMsg {
    const NAME: &'static str = "delete_msg";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct GetMsg {
    pub message_id: i64,
}

impl ApiAction for GetMsg {
    const NAME: &'static str = "get_msg";
    type Response = GetMsgResponse;
}

/// A fetched message, discriminated by where it was sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum GetMsgResponse {
    Private {
        time: i64,
        message_id: i64,
        real_id: i64,
        sender: PrivateSender,
    },
    Group {
        time: i64,
        message_id: i64,
        real_id: i64,
        sender: GroupSender,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct GetForwardMsg {
    pub id: String,
}

impl ApiAction for GetForwardMsg {
    const NAME: &'static str = "get_forward_msg";
    type Response = GetForwardMsgResponse;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetForwardMsgResponse {
    pub message: Message,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendLike {
    pub user_id: i64,
    /// Number of likes, capped by the server per friend per day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times: Option<i64>,
}

impl ApiAction for SendLike {
    const NAME: &'static str = "send_like";
    type Response = ();
}

// ============================================================================
// Group administration
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SetGroupKick {
    pub group_id: i64,
    pub user_id: i64,
    /// Also reject any future join request from this user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_add_request: Option<bool>,
}

impl ApiAction for SetGroupKick {
    const NAME: &'static str = "set_group_kick";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct SetGroupBan {
    pub group_id: i64,
    pub user_id: i64,
    /// Ban length in seconds; 0 lifts the ban. Server default is 30 minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl ApiAction for SetGroupBan {
    const NAME: &'static str = "set_group_ban";
    type Response = ();
}

/// Ban an anonymous sender. At least one of `anonymous` and
/// `anonymous_flag` must be set; use [`SetGroupAnonymousBan::by_info`] or
/// [`SetGroupAnonymousBan::by_flag`] to hold that invariant.
#[derive(Debug, Clone, Serialize)]
pub struct SetGroupAnonymousBan {
    pub group_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<Anonymous>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymous_flag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl SetGroupAnonymousBan {
    /// Ban via the full anonymous identity from the triggering event.
    pub fn by_info(group_id: i64, anonymous: Anonymous, duration: Option<i64>) -> Self {
        Self {
            group_id,
            anonymous: Some(anonymous),
            anonymous_flag: None,
            duration,
        }
    }

    /// Ban via the opaque `flag` alone.
    pub fn by_flag(group_id: i64, flag: impl Into<String>, duration: Option<i64>) -> Self {
        Self {
            group_id,
            anonymous: None,
            anonymous_flag: Some(flag.into()),
            duration,
        }
    }
}

impl ApiAction for SetGroupAnonymousBan {
    const NAME: &'static str = "set_group_anonymous_ban";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct SetGroupWholeBan {
    pub group_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
}

impl ApiAction for SetGroupWholeBan {
    const NAME: &'static str = "set_group_whole_ban";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct SetGroupAdmin {
    pub group_id: i64,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
}

impl ApiAction for SetGroupAdmin {
    const NAME: &'static str = "set_group_admin";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct SetGroupAnonymous {
    pub group_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
}

impl ApiAction for SetGroupAnonymous {
    const NAME: &'static str = "set_group_anonymous";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct SetGroupCard {
    pub group_id: i64,
    pub user_id: i64,
    /// Empty or omitted clears the card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
}

impl ApiAction for SetGroupCard {
    const NAME: &'static str = "set_group_card";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct SetGroupName {
    pub group_id: i64,
    pub group_name: String,
}

impl ApiAction for SetGroupName {
    const NAME: &'static str = "set_group_name";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct SetGroupLeave {
    pub group_id: i64,
    /// Dissolve the group instead of leaving; only effective for the owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dismiss: Option<bool>,
}

impl ApiAction for SetGroupLeave {
    const NAME: &'static str = "set_group_leave";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct SetGroupSpecialTitle {
    pub group_id: i64,
    pub user_id: i64,
    /// Empty or omitted clears the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_title: Option<String>,
    /// Seconds of validity; -1 means permanent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl ApiAction for SetGroupSpecialTitle {
    const NAME: &'static str = "set_group_special_title";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct SetFriendAddRequest {
    pub flag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approve: Option<bool>,
    /// Friend remark applied on approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl ApiAction for SetFriendAddRequest {
    const NAME: &'static str = "set_friend_add_request";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct SetGroupAddRequest {
    pub flag: String,
    pub sub_type: GroupRequestSubType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approve: Option<bool>,
    /// Rejection reason, only meaningful when rejecting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApiAction for SetGroupAddRequest {
    const NAME: &'static str = "set_group_add_request";
    type Response = ();
}

// ============================================================================
// Account and contact queries
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GetLoginInfo {}

impl ApiAction for GetLoginInfo {
    const NAME: &'static str = "get_login_info";
    type Response = LoginInfo;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInfo {
    pub user_id: i64,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetStrangerInfo {
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_cache: Option<bool>,
}

impl ApiAction for GetStrangerInfo {
    const NAME: &'static str = "get_stranger_info";
    type Response = StrangerInfo;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrangerInfo {
    pub user_id: i64,
    pub nickname: String,
    pub sex: Sex,
    pub age: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetFriendList {}

impl ApiAction for GetFriendList {
    const NAME: &'static str = "get_friend_list";
    type Response = Vec<FriendInfo>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendInfo {
    pub user_id: i64,
    pub nickname: String,
    pub remark: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetGroupInfo {
    pub group_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_cache: Option<bool>,
}

impl ApiAction for GetGroupInfo {
    const NAME: &'static str = "get_group_info";
    type Response = GroupInfo;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    pub group_id: i64,
    pub group_number: String,
    pub member_count: i64,
    pub max_member_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetGroupList {}

impl ApiAction for GetGroupList {
    const NAME: &'static str = "get_group_list";
    type Response = Vec<GroupInfo>;
}

#[derive(Debug, Clone, Serialize)]
pub struct GetGroupMemberInfo {
    pub group_id: i64,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_cache: Option<bool>,
}

impl ApiAction for GetGroupMemberInfo {
    const NAME: &'static str = "get_group_member_info";
    type Response = GroupMember;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub group_id: i64,
    pub user_id: i64,
    pub nickname: String,
    pub card: String,
    pub sex: Sex,
    pub age: i64,
    pub area: String,
    pub join_time: i64,
    pub last_sent_time: i64,
    pub level: String,
    pub role: GroupRole,
    pub unfriendly: bool,
    pub title: String,
    pub title_expire_time: i64,
    pub card_changable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetGroupMemberList {
    pub group_id: i64,
}

impl ApiAction for GetGroupMemberList {
    const NAME: &'static str = "get_group_member_list";
    type Response = Vec<GroupMember>;
}

#[derive(Debug, Clone, Serialize)]
pub struct GetGroupHonorInfo {
    pub group_id: i64,
    #[serde(rename = "type")]
    pub kind: HonorQuery,
}

impl ApiAction for GetGroupHonorInfo {
    const NAME: &'static str = "get_group_honor_info";
    type Response = GroupHonorInfo;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HonorQuery {
    Talkative,
    Performer,
    Legend,
    StrongNewbie,
    Emotion,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupHonorInfo {
    pub group_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_talkative: Option<CurrentTalkative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub talkative_list: Option<Vec<HonorUser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performer_list: Option<Vec<HonorUser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_list: Option<Vec<HonorUser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strong_newbie_list: Option<Vec<HonorUser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion_list: Option<Vec<HonorUser>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentTalkative {
    pub user_id: i64,
    pub nickname: String,
    pub avatar: String,
    pub day_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HonorUser {
    pub user_id: i64,
    pub nickname: String,
    pub avatar: String,
    pub description: String,
}

// ============================================================================
// Credentials and assets
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GetCookies {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl ApiAction for GetCookies {
    const NAME: &'static str = "get_cookies";
    type Response = CookiesResponse;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookiesResponse {
    pub cookies: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetCsrfToken {}

impl ApiAction for GetCsrfToken {
    const NAME: &'static str = "get_csrf_token";
    type Response = CsrfTokenResponse;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfTokenResponse {
    pub token: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl ApiAction for GetCredentials {
    const NAME: &'static str = "get_credentials";
    type Response = CredentialsResponse;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsResponse {
    pub cookies: String,
    pub token: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetRecord {
    pub file: String,
    pub out_format: RecordFormat,
}

impl ApiAction for GetRecord {
    const NAME: &'static str = "get_record";
    type Response = FileResponse;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFormat {
    Mp3,
    Amr,
    Wma,
    M4a,
    Spx,
    Ogg,
    Wav,
    Flac,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetImage {
    pub file: String,
}

impl ApiAction for GetImage {
    const NAME: &'static str = "get_image";
    type Response = FileResponse;
}

/// Local path of a downloaded asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    pub file: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CanSendImage {}

impl ApiAction for CanSendImage {
    const NAME: &'static str = "can_send_image";
    type Response = YesResponse;
}

#[derive(Debug, Clone, Serialize)]
pub struct CanSendRecord {}

impl ApiAction for CanSendRecord {
    const NAME: &'static str = "can_send_record";
    type Response = YesResponse;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YesResponse {
    pub yes: bool,
}

// ============================================================================
// Runtime
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GetStatus {}

impl ApiAction for GetStatus {
    const NAME: &'static str = "get_status";
    type Response = Status;
}

/// Server runtime status. Implementations attach arbitrary extra fields,
/// which are preserved in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub online: bool,
    pub good: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetVersionInfo {}

impl ApiAction for GetVersionInfo {
    const NAME: &'static str = "get_version_info";
    type Response = VersionInfo;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub app_name: String,
    pub app_version: String,
    pub protocol_version: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetRestart {
    /// Milliseconds to wait before restarting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<i64>,
}

impl ApiAction for SetRestart {
    const NAME: &'static str = "set_restart";
    type Response = ();
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanCache {}

impl ApiAction for CleanCache {
    const NAME: &'static str = "clean_cache";
    type Response = ();
}

// ============================================================================
// Hidden actions
// ============================================================================

/// Event-scoped reaction, the wire vehicle for quick operations. Sessions
/// send this without an echo; it is registered like any other action so the
/// catalogue stays complete.
#[derive(Debug, Clone, Serialize)]
pub struct HandleQuickOperation {
    pub context: Event,
    pub operation: QuickOperation,
}

impl ApiAction for HandleQuickOperation {
    const NAME: &'static str = ".handle_quick_operation";
    type Response = ();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;

    #[test]
    fn test_send_msg_serializes_discriminator() {
        let params = SendMsg::Group {
            group_id: 123,
            message: vec![Segment::text("hi")],
            auto_escape: None,
        };
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains(r#""message_type":"group""#));
        assert!(json.contains(r#""group_id":123"#));
        assert!(!json.contains("auto_escape"));
    }

    #[test]
    fn test_get_msg_response_selects_variant() {
        let json = r#"{"time":1,"message_type":"private","message_id":7,"real_id":8,"sender":{"nickname":"bob"}}"#;
        let resp: GetMsgResponse = serde_json::from_str(json).unwrap();
        match resp {
            GetMsgResponse::Private { sender, .. } => {
                assert_eq!(sender.nickname.as_deref(), Some("bob"));
            }
            GetMsgResponse::Group { .. } => panic!("expected private variant"),
        }
    }

    #[test]
    fn test_status_preserves_extra_fields() {
        let json = r#"{"online":true,"good":true,"plugins_good":true}"#;
        let status: Status = serde_json::from_str(json).unwrap();
        assert!(status.online);
        assert_eq!(
            status.extra.get("plugins_good"),
            Some(&serde_json::Value::Bool(true))
        );
    }
}
