//! Typed protocol events.
//!
//! Every inbound event carries the base fields `time` and `self_id` plus a
//! two-level tag: `post_type` selects the family, and a family-specific
//! discriminator field (`message_type`, `notice_type`, `request_type`,
//! `meta_event_type`) selects the concrete variant within it.
//!
//! The serde derives here describe the wire shape; frame-level decoding
//! goes through [`crate::decode::decode_event`], which performs the tag
//! dispatch explicitly so each failure mode is reported distinctly.

mod message;
mod meta;
mod notice;
mod request;

pub use message::{
    Anonymous, GroupMessageEvent, GroupMessageSubType, GroupRole, GroupSender, MessageEvent,
    PrivateMessageEvent, PrivateMessageSubType, PrivateSender, Sex,
};
pub use meta::{HeartbeatEvent, LifecycleEvent, LifecycleSubType, MetaEvent};
pub use notice::{
    FileInfo, FriendAddNotice, FriendRecallNotice, GroupAdminNotice, GroupAdminSubType,
    GroupBanNotice, GroupBanSubType, GroupDecreaseNotice, GroupDecreaseSubType,
    GroupIncreaseNotice, GroupIncreaseSubType, GroupRecallNotice, GroupUploadNotice, HonorKind,
    HonorNotify, LuckyKingNotify, NoticeEvent, NotifyNotice, PokeNotify,
};
pub use request::{FriendRequestEvent, GroupRequestEvent, GroupRequestSubType, RequestEvent};

use serde::{Deserialize, Serialize};

/// An inbound protocol event, tagged by `post_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "post_type", rename_all = "snake_case")]
pub enum Event {
    Message(MessageEvent),
    Notice(NoticeEvent),
    Request(RequestEvent),
    MetaEvent(MetaEvent),
}

impl Event {
    /// Wire name of this event's family.
    pub fn post_type(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Notice(_) => "notice",
            Self::Request(_) => "request",
            Self::MetaEvent(_) => "meta_event",
        }
    }

    /// Value of the family's discriminator field for this event.
    ///
    /// Together with [`Self::post_type`] this identifies the exact variant
    /// bucket, which is what quick operations are bound to.
    pub fn discriminator_value(&self) -> &'static str {
        match self {
            Self::Message(e) => e.message_type(),
            Self::Notice(e) => e.notice_type(),
            Self::Request(e) => e.request_type(),
            Self::MetaEvent(e) => e.meta_event_type(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_both_tag_levels() {
        let event = Event::Request(RequestEvent::Friend(FriendRequestEvent {
            time: 1722409000,
            self_id: 10001,
            user_id: 20002,
            comment: "hi".to_string(),
            flag: "flag-1".to_string(),
        }));

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""post_type":"request""#));
        assert!(json.contains(r#""request_type":"friend""#));
        assert!(json.contains(r#""self_id":10001"#));
    }

    #[test]
    fn test_bucket_accessors() {
        let event = Event::MetaEvent(MetaEvent::Lifecycle(LifecycleEvent {
            time: 0,
            self_id: 1,
            sub_type: LifecycleSubType::Connect,
        }));
        assert_eq!(event.post_type(), "meta_event");
        assert_eq!(event.discriminator_value(), "lifecycle");
    }
}
