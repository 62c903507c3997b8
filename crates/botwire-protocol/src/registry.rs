//! Schema registry binding wire names and tags to typed shapes.
//!
//! The registry is an explicit object built by ordered registration calls
//! during process initialization and read-only afterwards. Nothing here is
//! process-global: tests build partial registries, and sessions receive a
//! reference to whichever registry their process assembled.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{self, ApiAction};
use crate::error::{DecodeError, RegistryError, RegistryResult};
use crate::event::{Event, MessageEvent, MetaEvent, NoticeEvent, RequestEvent};
use crate::quick::QuickOpKind;

type ResponseDecoder = Arc<dyn Fn(Value) -> Result<Box<dyn Any + Send>, DecodeError> + Send + Sync>;
type VariantDecoder = Arc<dyn Fn(&Value) -> Result<Event, DecodeError> + Send + Sync>;

/// One registered action: its type-erased response decoder.
pub struct ActionEntry {
    decoder: ResponseDecoder,
}

impl std::fmt::Debug for ActionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEntry").finish_non_exhaustive()
    }
}

impl ActionEntry {
    /// Decode a response `data` payload against the registered shape.
    pub fn decode_response(&self, data: Value) -> Result<Box<dyn Any + Send>, DecodeError> {
        (self.decoder)(data)
    }
}

/// One registered event family: its discriminator field and the decoders
/// for each known discriminator value.
pub(crate) struct FamilyEntry {
    discriminator: String,
    variants: HashMap<String, VariantDecoder>,
}

impl FamilyEntry {
    pub(crate) fn discriminator(&self) -> &str {
        &self.discriminator
    }

    pub(crate) fn variant(&self, value: &str) -> Option<&VariantDecoder> {
        self.variants.get(value)
    }
}

/// Static catalog mapping wire-level names and tags to typed shapes.
#[derive(Default)]
pub struct ProtocolRegistry {
    actions: HashMap<String, ActionEntry>,
    families: HashMap<String, FamilyEntry>,
    quick_ops: HashMap<(String, String), QuickOpKind>,
}

impl ProtocolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action by its wire name, binding its typed response
    /// shape.
    pub fn register_action<A>(&mut self) -> RegistryResult<()>
    where
        A: ApiAction + 'static,
    {
        if self.actions.contains_key(A::NAME) {
            return Err(RegistryError::DuplicateAction(A::NAME.to_string()));
        }
        let decoder: ResponseDecoder = Arc::new(|data: Value| {
            serde_json::from_value::<A::Response>(data)
                .map(|response| Box::new(response) as Box<dyn Any + Send>)
                .map_err(|source| DecodeError::SchemaValidation {
                    path: format!("response.{}", A::NAME),
                    source,
                })
        });
        self.actions
            .insert(A::NAME.to_string(), ActionEntry { decoder });
        Ok(())
    }

    /// Look up an action by wire name.
    pub fn lookup_action(&self, name: &str) -> RegistryResult<&ActionEntry> {
        self.actions
            .get(name)
            .ok_or_else(|| RegistryError::UnknownAction(name.to_string()))
    }

    /// Register an event family and the name of its discriminator field.
    pub fn register_event_family(
        &mut self,
        post_type: &str,
        discriminator: &str,
    ) -> RegistryResult<()> {
        if self.families.contains_key(post_type) {
            return Err(RegistryError::DuplicateFamily(post_type.to_string()));
        }
        self.families.insert(
            post_type.to_string(),
            FamilyEntry {
                discriminator: discriminator.to_string(),
                variants: HashMap::new(),
            },
        );
        Ok(())
    }

    /// Bind the concrete typed shape for a `(family, discriminator value)`
    /// bucket. `wrap` lifts the decoded shape into [`Event`].
    pub fn register_event_variant<T, F>(
        &mut self,
        post_type: &str,
        value: &str,
        wrap: F,
    ) -> RegistryResult<()>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Event + Send + Sync + 'static,
    {
        let family = self
            .families
            .get_mut(post_type)
            .ok_or_else(|| RegistryError::UnregisteredFamily(post_type.to_string()))?;
        if family.variants.contains_key(value) {
            return Err(RegistryError::DuplicateEventVariant(
                post_type.to_string(),
                value.to_string(),
            ));
        }
        let path = format!("{post_type}.{value}");
        let decoder: VariantDecoder = Arc::new(move |raw: &Value| {
            serde_json::from_value::<T>(raw.clone())
                .map(&wrap)
                .map_err(|source| DecodeError::SchemaValidation {
                    path: path.clone(),
                    source,
                })
        });
        family.variants.insert(value.to_string(), decoder);
        Ok(())
    }

    /// Bind a quick-operation shape to a `(family, discriminator value)`
    /// bucket.
    pub fn register_quick_operation(
        &mut self,
        post_type: &str,
        value: &str,
        kind: QuickOpKind,
    ) -> RegistryResult<()> {
        let bucket = (post_type.to_string(), value.to_string());
        if self.quick_ops.contains_key(&bucket) {
            return Err(RegistryError::DuplicateQuickOperation(
                post_type.to_string(),
                value.to_string(),
            ));
        }
        self.quick_ops.insert(bucket, kind);
        Ok(())
    }

    /// The quick-operation shape bound to a bucket.
    pub fn resolve_quick_operation(
        &self,
        post_type: &str,
        value: &str,
    ) -> RegistryResult<QuickOpKind> {
        self.quick_ops
            .get(&(post_type.to_string(), value.to_string()))
            .copied()
            .ok_or_else(|| {
                RegistryError::NoQuickOperationDefined(post_type.to_string(), value.to_string())
            })
    }

    pub(crate) fn family(&self, post_type: &str) -> Option<&FamilyEntry> {
        self.families.get(post_type)
    }

    /// The fully-populated registry for the OneBot v11 surface: every
    /// event family and variant, every quick-operation binding, and the
    /// complete action catalogue.
    pub fn onebot_v11() -> Self {
        Self::build_onebot_v11().expect("built-in catalogue registers each name exactly once")
    }

    fn build_onebot_v11() -> RegistryResult<Self> {
        use crate::event::{
            FriendAddNotice, FriendRecallNotice, FriendRequestEvent, GroupAdminNotice,
            GroupBanNotice, GroupDecreaseNotice, GroupIncreaseNotice, GroupMessageEvent,
            GroupRecallNotice, GroupRequestEvent, GroupUploadNotice, HeartbeatEvent,
            LifecycleEvent, NotifyNotice, PrivateMessageEvent,
        };
        use crate::quick::QuickOpKind as Kind;

        let mut reg = Self::new();

        reg.register_event_family("message", "message_type")?;
        reg.register_event_family("notice", "notice_type")?;
        reg.register_event_family("request", "request_type")?;
        reg.register_event_family("meta_event", "meta_event_type")?;

        reg.register_event_variant("message", "private", |e: PrivateMessageEvent| {
            Event::Message(MessageEvent::Private(e))
        })?;
        reg.register_event_variant("message", "group", |e: GroupMessageEvent| {
            Event::Message(MessageEvent::Group(e))
        })?;

        reg.register_event_variant("notice", "group_upload", |e: GroupUploadNotice| {
            Event::Notice(NoticeEvent::GroupUpload(e))
        })?;
        reg.register_event_variant("notice", "group_admin", |e: GroupAdminNotice| {
            Event::Notice(NoticeEvent::GroupAdmin(e))
        })?;
        reg.register_event_variant("notice", "group_decrease", |e: GroupDecreaseNotice| {
            Event::Notice(NoticeEvent::GroupDecrease(e))
        })?;
        reg.register_event_variant("notice", "group_increase", |e: GroupIncreaseNotice| {
            Event::Notice(NoticeEvent::GroupIncrease(e))
        })?;
        reg.register_event_variant("notice", "group_ban", |e: GroupBanNotice| {
            Event::Notice(NoticeEvent::GroupBan(e))
        })?;
        reg.register_event_variant("notice", "friend_add", |e: FriendAddNotice| {
            Event::Notice(NoticeEvent::FriendAdd(e))
        })?;
        reg.register_event_variant("notice", "group_recall", |e: GroupRecallNotice| {
            Event::Notice(NoticeEvent::GroupRecall(e))
        })?;
        reg.register_event_variant("notice", "friend_recall", |e: FriendRecallNotice| {
            Event::Notice(NoticeEvent::FriendRecall(e))
        })?;
        reg.register_event_variant("notice", "notify", |e: NotifyNotice| {
            Event::Notice(NoticeEvent::Notify(e))
        })?;

        reg.register_event_variant("request", "friend", |e: FriendRequestEvent| {
            Event::Request(RequestEvent::Friend(e))
        })?;
        reg.register_event_variant("request", "group", |e: GroupRequestEvent| {
            Event::Request(RequestEvent::Group(e))
        })?;

        reg.register_event_variant("meta_event", "lifecycle", |e: LifecycleEvent| {
            Event::MetaEvent(MetaEvent::Lifecycle(e))
        })?;
        reg.register_event_variant("meta_event", "heartbeat", |e: HeartbeatEvent| {
            Event::MetaEvent(MetaEvent::Heartbeat(e))
        })?;

        reg.register_quick_operation("message", "private", Kind::PrivateMessage)?;
        reg.register_quick_operation("message", "group", Kind::GroupMessage)?;
        reg.register_quick_operation("request", "friend", Kind::FriendRequest)?;
        reg.register_quick_operation("request", "group", Kind::GroupRequest)?;

        reg.register_action::<api::SendPrivateMsg>()?;
        reg.register_action::<api::SendGroupMsg>()?;
        reg.register_action::<api::SendMsg>()?;
        reg.register_action::<api::DeleteMsg>()?;
        reg.register_action::<api::GetMsg>()?;
        reg.register_action::<api::GetForwardMsg>()?;
        reg.register_action::<api::SendLike>()?;
        reg.register_action::<api::SetGroupKick>()?;
        reg.register_action::<api::SetGroupBan>()?;
        reg.register_action::<api::SetGroupAnonymousBan>()?;
        reg.register_action::<api::SetGroupWholeBan>()?;
        reg.register_action::<api::SetGroupAdmin>()?;
        reg.register_action::<api::SetGroupAnonymous>()?;
        reg.register_action::<api::SetGroupCard>()?;
        reg.register_action::<api::SetGroupName>()?;
        reg.register_action::<api::SetGroupLeave>()?;
        reg.register_action::<api::SetGroupSpecialTitle>()?;
        reg.register_action::<api::SetFriendAddRequest>()?;
        reg.register_action::<api::SetGroupAddRequest>()?;
        reg.register_action::<api::GetLoginInfo>()?;
        reg.register_action::<api::GetStrangerInfo>()?;
        reg.register_action::<api::GetFriendList>()?;
        reg.register_action::<api::GetGroupInfo>()?;
        reg.register_action::<api::GetGroupList>()?;
        reg.register_action::<api::GetGroupMemberInfo>()?;
        reg.register_action::<api::GetGroupMemberList>()?;
        reg.register_action::<api::GetGroupHonorInfo>()?;
        reg.register_action::<api::GetCookies>()?;
        reg.register_action::<api::GetCsrfToken>()?;
        reg.register_action::<api::GetCredentials>()?;
        reg.register_action::<api::GetRecord>()?;
        reg.register_action::<api::GetImage>()?;
        reg.register_action::<api::CanSendImage>()?;
        reg.register_action::<api::CanSendRecord>()?;
        reg.register_action::<api::GetStatus>()?;
        reg.register_action::<api::GetVersionInfo>()?;
        reg.register_action::<api::SetRestart>()?;
        reg.register_action::<api::CleanCache>()?;
        reg.register_action::<api::HandleQuickOperation>()?;

        Ok(reg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GetLoginInfo, LoginInfo, SendPrivateMsg};
    use serde_json::json;

    #[test]
    fn test_register_then_lookup_round_trips() {
        let mut reg = ProtocolRegistry::new();
        reg.register_action::<SendPrivateMsg>().unwrap();

        let entry = reg.lookup_action("send_private_msg").unwrap();
        let decoded = entry.decode_response(json!({"message_id": 42})).unwrap();
        let response = decoded
            .downcast::<crate::api::MessageIdResponse>()
            .expect("decoder produces the registered shape");
        assert_eq!(response.message_id, 42);
    }

    #[test]
    fn test_duplicate_action_rejected() {
        let mut reg = ProtocolRegistry::new();
        reg.register_action::<GetLoginInfo>().unwrap();
        let err = reg.register_action::<GetLoginInfo>().unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAction(name) if name == "get_login_info"));
    }

    #[test]
    fn test_unknown_action_lookup_fails() {
        let reg = ProtocolRegistry::new();
        let err = reg.lookup_action("no_such_action").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownAction(name) if name == "no_such_action"));
    }

    #[test]
    fn test_duplicate_family_rejected() {
        let mut reg = ProtocolRegistry::new();
        reg.register_event_family("message", "message_type").unwrap();
        let err = reg
            .register_event_family("message", "message_type")
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateFamily(_)));
    }

    #[test]
    fn test_variant_requires_family() {
        let mut reg = ProtocolRegistry::new();
        let err = reg
            .register_event_variant("message", "private", |e: crate::event::PrivateMessageEvent| {
                Event::Message(MessageEvent::Private(e))
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnregisteredFamily(_)));
    }

    #[test]
    fn test_quick_operation_bucket_is_exclusive() {
        let mut reg = ProtocolRegistry::new();
        reg.register_quick_operation("message", "private", QuickOpKind::PrivateMessage)
            .unwrap();
        let err = reg
            .register_quick_operation("message", "private", QuickOpKind::GroupMessage)
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateQuickOperation(_, _)));

        assert_eq!(
            reg.resolve_quick_operation("message", "private").unwrap(),
            QuickOpKind::PrivateMessage
        );
        let err = reg.resolve_quick_operation("message", "group").unwrap_err();
        assert!(matches!(err, RegistryError::NoQuickOperationDefined(_, _)));
    }

    #[test]
    fn test_builtin_catalogue_builds() {
        let reg = ProtocolRegistry::onebot_v11();
        assert!(reg.lookup_action("send_private_msg").is_ok());
        assert!(reg.lookup_action(".handle_quick_operation").is_ok());
        assert_eq!(
            reg.resolve_quick_operation("request", "group").unwrap(),
            QuickOpKind::GroupRequest
        );
        // deliberately unregistered: no reaction exists for notices
        assert!(reg.resolve_quick_operation("notice", "notify").is_err());
    }

    #[test]
    fn test_login_info_decodes_through_entry() {
        let reg = ProtocolRegistry::onebot_v11();
        let entry = reg.lookup_action("get_login_info").unwrap();
        let decoded = entry
            .decode_response(json!({"user_id": 10001, "nickname": "bot"}))
            .unwrap();
        let info = decoded.downcast::<LoginInfo>().unwrap();
        assert_eq!(info.user_id, 10001);
    }
}
