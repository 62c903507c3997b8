//! Message segments.
//!
//! A message on the wire is an ordered list of segments, each a tagged
//! wrapper `{"type": <kind>, "data": {...}}`. Several kinds carry a
//! different data shape depending on direction (received from the server
//! vs composed for sending); those are untagged unions tried in
//! declaration order, and the shapes are kept field-disjoint so at most
//! one can match valid input.

use serde::{Deserialize, Serialize};

/// A complete message: an ordered list of segments.
pub type Message = Vec<Segment>;

/// One unit of message content, tagged by `type` with its payload under
/// `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Segment {
    Text(TextData),
    Face(FaceData),
    Image(ImageData),
    Record(RecordData),
    Video(VideoData),
    At(AtData),
    Rps(EmptyData),
    Dice(EmptyData),
    Shake(EmptyData),
    Poke(PokeData),
    Anonymous(AnonymousData),
    Share(ShareData),
    Contact(ContactData),
    Location(LocationData),
    Music(MusicData),
    Reply(ReplyData),
    Forward(ForwardData),
    Node(NodeData),
    Xml(XmlData),
    Json(JsonData),
}

impl Segment {
    /// Plain text segment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextData { text: text.into() })
    }

    /// Mention of a user by id (`@someone`).
    pub fn at(qq: impl Into<String>) -> Self {
        Self::At(AtData { qq: qq.into() })
    }

    /// Reference to an earlier message.
    pub fn reply(id: impl Into<String>) -> Self {
        Self::Reply(ReplyData { id: id.into() })
    }
}

/// Wire flag constrained to the integer literals 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BinaryFlag {
    Off,
    On,
}

impl From<BinaryFlag> for u8 {
    fn from(flag: BinaryFlag) -> Self {
        match flag {
            BinaryFlag::Off => 0,
            BinaryFlag::On => 1,
        }
    }
}

impl TryFrom<u8> for BinaryFlag {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            other => Err(format!("expected 0 or 1, got {other}")),
        }
    }
}

impl From<bool> for BinaryFlag {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceData {
    pub id: String,
}

/// Non-default rendering of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageEffect {
    Flash,
}

/// Image payload. Received images carry the resolved download `url`;
/// sending images carry cache/proxy controls instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageData {
    Received(ReceivedImage),
    Sending(SendingImage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedImage {
    pub file: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<ImageEffect>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendingImage {
    pub file: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<ImageEffect>,
    pub cache: BinaryFlag,
    pub proxy: BinaryFlag,
    pub timeout: i64,
}

/// Voice recording payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordData {
    Received(ReceivedRecord),
    Sending(SendingRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedRecord {
    pub file: String,
    pub magic: BinaryFlag,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendingRecord {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic: Option<BinaryFlag>,
    pub cache: BinaryFlag,
    pub proxy: BinaryFlag,
    pub timeout: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoData {
    Received(ReceivedVideo),
    Sending(SendingVideo),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedVideo {
    pub file: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendingVideo {
    pub file: String,
    pub cache: BinaryFlag,
    pub proxy: BinaryFlag,
    pub timeout: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtData {
    pub qq: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmptyData {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PokeData {
    Received(ReceivedPoke),
    Sending(SendingPoke),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedPoke {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendingPoke {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// Anonymous-sender marker. The sending shape carries `ignore` and must be
/// tried first: the received shape is the empty object and would otherwise
/// swallow both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnonymousData {
    Sending(SendingAnonymous),
    Received(ReceivedAnonymous),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReceivedAnonymous {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendingAnonymous {
    pub ignore: BinaryFlag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShareData {
    Received(ReceivedShare),
    Sending(SendingShare),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedShare {
    pub url: String,
    pub title: String,
    pub content: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendingShare {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Recommendation card for a user or a group, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContactData {
    Qq { id: String },
    Group { id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationData {
    Received(ReceivedLocation),
    Sending(SendingLocation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedLocation {
    pub lat: f64,
    pub lon: f64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendingLocation {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Music share card, tagged by `type`. Platform variants reference a track
/// id on that platform; `custom` carries the full card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MusicData {
    #[serde(rename = "qq")]
    Qq { id: String },
    #[serde(rename = "163")]
    Netease { id: String },
    #[serde(rename = "xm")]
    Xm { id: String },
    #[serde(rename = "custom")]
    Custom {
        url: String,
        audio: String,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyData {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardData {
    pub id: String,
}

/// Forward node: either a reference to an existing message or inline
/// custom content (which recurses into a full [`Message`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeData {
    Forwarded(NodeRef),
    Custom(NodeCustom),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCustom {
    pub user_id: String,
    pub nickname: String,
    pub content: Message,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmlData {
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonData {
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_segment_round_trip() {
        let segment = Segment::text("hello");
        let json = serde_json::to_string(&segment).unwrap();
        assert_eq!(json, r#"{"type":"text","data":{"text":"hello"}}"#);

        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, segment);
    }

    #[test]
    fn test_image_data_selects_received_shape() {
        let json = r#"{"type":"image","data":{"file":"a.jpg","url":"https://img.example/a.jpg"}}"#;
        let segment: Segment = serde_json::from_str(json).unwrap();
        match segment {
            Segment::Image(ImageData::Received(img)) => {
                assert_eq!(img.url, "https://img.example/a.jpg");
                assert!(img.effect.is_none());
            }
            other => panic!("expected received image, got {other:?}"),
        }
    }

    #[test]
    fn test_image_data_selects_sending_shape() {
        let json = r#"{"type":"image","data":{"file":"a.jpg","cache":1,"proxy":0,"timeout":30}}"#;
        let segment: Segment = serde_json::from_str(json).unwrap();
        match segment {
            Segment::Image(ImageData::Sending(img)) => {
                assert_eq!(img.cache, BinaryFlag::On);
                assert_eq!(img.proxy, BinaryFlag::Off);
            }
            other => panic!("expected sending image, got {other:?}"),
        }
    }

    #[test]
    fn test_anonymous_data_sending_shape_wins_when_ignore_present() {
        let json = r#"{"type":"anonymous","data":{"ignore":1}}"#;
        let segment: Segment = serde_json::from_str(json).unwrap();
        match segment {
            Segment::Anonymous(AnonymousData::Sending(a)) => {
                assert_eq!(a.ignore, BinaryFlag::On)
            }
            other => panic!("expected sending anonymous, got {other:?}"),
        }

        let json = r#"{"type":"anonymous","data":{}}"#;
        let segment: Segment = serde_json::from_str(json).unwrap();
        assert!(matches!(
            segment,
            Segment::Anonymous(AnonymousData::Received(_))
        ));
    }

    #[test]
    fn test_music_numeric_platform_tag() {
        let segment = Segment::Music(MusicData::Netease {
            id: "509842".to_string(),
        });
        let json = serde_json::to_string(&segment).unwrap();
        assert!(json.contains(r#""type":"163""#));

        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, segment);
    }

    #[test]
    fn test_binary_flag_rejects_other_integers() {
        let err = serde_json::from_str::<BinaryFlag>("2").unwrap_err();
        assert!(err.to_string().contains("expected 0 or 1"));
    }

    #[test]
    fn test_custom_node_recurses() {
        let json = r#"{"type":"node","data":{"user_id":"10001","nickname":"alice","content":[{"type":"text","data":{"text":"inner"}}]}}"#;
        let segment: Segment = serde_json::from_str(json).unwrap();
        match segment {
            Segment::Node(NodeData::Custom(node)) => {
                assert_eq!(node.content, vec![Segment::text("inner")]);
            }
            other => panic!("expected custom node, got {other:?}"),
        }
    }
}
