use serde::{Deserialize, Serialize};

/// A styled/typed range over the plain text of a message. Kind-specific
/// payload lives on the variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntityKind {
    #[serde(rename = "MessageEntityBold")]
    Bold,
    #[serde(rename = "MessageEntityItalic")]
    Italic,
    #[serde(rename = "MessageEntityUnderline")]
    Underline,
    #[serde(rename = "MessageEntityStrike")]
    Strike,
    #[serde(rename = "MessageEntityCode")]
    Code,
    #[serde(rename = "MessageEntityPre")]
    Pre {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    #[serde(rename = "MessageEntityBlockquote")]
    Blockquote {
        #[serde(rename = "canCollapse")]
        can_collapse: bool,
    },
    #[serde(rename = "MessageEntitySpoiler")]
    Spoiler,
    #[serde(rename = "MessageEntityUrl")]
    Url,
    #[serde(rename = "MessageEntityTextUrl")]
    TextUrl { url: String },
    #[serde(rename = "MessageEntityMentionName")]
    MentionName {
        #[serde(rename = "userId")]
        user_id: String,
    },
    #[serde(rename = "MessageEntityCustomEmoji")]
    CustomEmoji {
        #[serde(rename = "documentId")]
        document_id: String,
    },
    #[serde(rename = "MessageEntityEmail")]
    Email,
    #[serde(rename = "MessageEntityPhone")]
    Phone,
}

impl EntityKind {
    /// Wire name, also used as the `data-entity-type` attribute value.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Bold => "MessageEntityBold",
            EntityKind::Italic => "MessageEntityItalic",
            EntityKind::Underline => "MessageEntityUnderline",
            EntityKind::Strike => "MessageEntityStrike",
            EntityKind::Code => "MessageEntityCode",
            EntityKind::Pre { .. } => "MessageEntityPre",
            EntityKind::Blockquote { .. } => "MessageEntityBlockquote",
            EntityKind::Spoiler => "MessageEntitySpoiler",
            EntityKind::Url => "MessageEntityUrl",
            EntityKind::TextUrl { .. } => "MessageEntityTextUrl",
            EntityKind::MentionName { .. } => "MessageEntityMentionName",
            EntityKind::CustomEmoji { .. } => "MessageEntityCustomEmoji",
            EntityKind::Email => "MessageEntityEmail",
            EntityKind::Phone => "MessageEntityPhone",
        }
    }
}

/// A formatting entity over the final message text.
///
/// `offset` and `length` are UTF-8 byte positions into `FormattedText::text`,
/// always on char boundaries, with `offset + length <= text.len()` and
/// `length >= 1`. Entities may nest or overlap; order follows document order
/// of the nodes they were extracted from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(flatten)]
    pub kind: EntityKind,
    pub offset: usize,
    pub length: usize,
}

/// Plain message text plus its formatting entities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Entity>>,
}
