//! Discriminated decoding of untyped payloads into typed variants.
//!
//! Event decoding is an explicit two-level tag dispatch rather than one
//! opaque deserialization: `post_type` selects the family, the family's
//! registered discriminator field selects the concrete shape, and only
//! then is the payload validated structurally. Each step has its own
//! failure mode so diagnostics name exactly what went wrong.

use serde_json::Value;

use crate::error::DecodeError;
use crate::event::Event;
use crate::quick::QuickOperation;
use crate::registry::ProtocolRegistry;

/// Resolve a raw event payload to exactly one typed variant.
pub fn decode_event(registry: &ProtocolRegistry, raw: &Value) -> Result<Event, DecodeError> {
    let post_type = raw
        .get("post_type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingPostType)?;

    let family = registry
        .family(post_type)
        .ok_or_else(|| DecodeError::UnknownEventFamily(post_type.to_string()))?;

    let value = raw
        .get(family.discriminator())
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::MissingDiscriminator {
            family: post_type.to_string(),
            field: family.discriminator().to_string(),
        })?;

    let decoder = family
        .variant(value)
        .ok_or_else(|| DecodeError::UnknownEventVariant {
            family: post_type.to_string(),
            value: value.to_string(),
        })?;

    decoder(raw)
}

/// Check a candidate quick operation against the event it targets.
///
/// Computes the event's exact variant bucket, resolves the expected shape
/// from the registry, and compares declared variant identities. An
/// operation that is structurally compatible with the expected shape but
/// declares a different variant still fails.
pub fn check_quick_operation(
    registry: &ProtocolRegistry,
    event: &Event,
    operation: &QuickOperation,
) -> Result<(), DecodeError> {
    let expected =
        registry.resolve_quick_operation(event.post_type(), event.discriminator_value())?;
    let found = operation.kind();
    if found != expected {
        return Err(DecodeError::MismatchedQuickOperation { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MessageEvent, NoticeEvent};
    use crate::quick::{FriendRequestQuickOp, PrivateMessageQuickOp, QuickOperation};
    use serde_json::json;

    fn private_message_frame() -> Value {
        json!({
            "time": 1722409000,
            "self_id": 10001,
            "post_type": "message",
            "message_type": "private",
            "sub_type": "friend",
            "message_id": 77,
            "user_id": 20002,
            "message": [{"type": "text", "data": {"text": "hi"}}],
            "raw_message": "hi",
            "font": 0,
            "sender": {"user_id": 20002, "nickname": "alice"}
        })
    }

    #[test]
    fn test_decode_private_message_event() {
        let reg = ProtocolRegistry::onebot_v11();
        let event = decode_event(&reg, &private_message_frame()).unwrap();
        match &event {
            Event::Message(MessageEvent::Private(msg)) => {
                assert_eq!(msg.message_id, 77);
                assert_eq!(msg.sender.nickname.as_deref(), Some("alice"));
            }
            other => panic!("expected private message, got {other:?}"),
        }
        assert_eq!(event.discriminator_value(), "private");
    }

    #[test]
    fn test_decode_notify_sub_dispatch() {
        let reg = ProtocolRegistry::onebot_v11();
        let frame = json!({
            "time": 1722409001,
            "self_id": 10001,
            "post_type": "notice",
            "notice_type": "notify",
            "sub_type": "poke",
            "group_id": 9000,
            "user_id": 20002,
            "target_id": 10001
        });
        let event = decode_event(&reg, &frame).unwrap();
        assert!(matches!(
            event,
            Event::Notice(NoticeEvent::Notify(crate::event::NotifyNotice::Poke(_)))
        ));
    }

    #[test]
    fn test_missing_post_type() {
        let reg = ProtocolRegistry::onebot_v11();
        let err = decode_event(&reg, &json!({"self_id": 1})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingPostType));
    }

    #[test]
    fn test_unknown_event_family() {
        let reg = ProtocolRegistry::onebot_v11();
        let frame = json!({"post_type": "telemetry", "self_id": 1});
        let err = decode_event(&reg, &frame).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownEventFamily(f) if f == "telemetry"));
    }

    #[test]
    fn test_missing_discriminator() {
        let reg = ProtocolRegistry::onebot_v11();
        let frame = json!({"post_type": "message", "self_id": 1, "time": 0});
        let err = decode_event(&reg, &frame).unwrap_err();
        match err {
            DecodeError::MissingDiscriminator { family, field } => {
                assert_eq!(family, "message");
                assert_eq!(field, "message_type");
            }
            other => panic!("expected MissingDiscriminator, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_variant() {
        let reg = ProtocolRegistry::onebot_v11();
        let frame = json!({"post_type": "message", "message_type": "broadcast", "self_id": 1});
        let err = decode_event(&reg, &frame).unwrap_err();
        assert!(
            matches!(err, DecodeError::UnknownEventVariant { family, value } if family == "message" && value == "broadcast")
        );
    }

    #[test]
    fn test_schema_validation_names_the_bucket() {
        let reg = ProtocolRegistry::onebot_v11();
        let mut frame = private_message_frame();
        frame.as_object_mut().unwrap().remove("message_id");
        let err = decode_event(&reg, &frame).unwrap_err();
        match err {
            DecodeError::SchemaValidation { path, source } => {
                assert_eq!(path, "message.private");
                assert!(source.to_string().contains("message_id"));
            }
            other => panic!("expected SchemaValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_quick_operation_match_by_declared_identity() {
        let reg = ProtocolRegistry::onebot_v11();
        let event = decode_event(&reg, &private_message_frame()).unwrap();

        let matching = QuickOperation::PrivateMessage(PrivateMessageQuickOp::default());
        check_quick_operation(&reg, &event, &matching).unwrap();

        // Structurally a FriendRequestQuickOp (all fields optional) would
        // serialize fine against the private-message bucket; identity says no.
        let wrong = QuickOperation::FriendRequest(FriendRequestQuickOp::default());
        let err = check_quick_operation(&reg, &event, &wrong).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MismatchedQuickOperation { .. }
        ));
    }

    #[test]
    fn test_quick_operation_unbound_bucket() {
        let reg = ProtocolRegistry::onebot_v11();
        let frame = json!({
            "time": 0,
            "self_id": 1,
            "post_type": "meta_event",
            "meta_event_type": "lifecycle",
            "sub_type": "connect"
        });
        let event = decode_event(&reg, &frame).unwrap();
        let op = QuickOperation::PrivateMessage(PrivateMessageQuickOp::default());
        let err = check_quick_operation(&reg, &event, &op).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Registry(crate::error::RegistryError::NoQuickOperationDefined(_, _))
        ));
    }
}
