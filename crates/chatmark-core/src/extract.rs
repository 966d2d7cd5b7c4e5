use crate::entity::{Entity, EntityKind, FormattedText};
use crate::tree::{NodeKind, TreeNode, inner_text};

/// Extraction stops below this depth so pathological markup cannot blow the
/// stack.
pub const MAX_TAG_DEPTH: usize = 15;

/// Walks an already-parsed fragment and produces the plain text plus its
/// entities. `markup_starts_with_tag` selects the asymmetric trim: when the
/// rewritten markup opens with a tag, leading whitespace is structurally
/// meaningful and only the tail is trimmed. Trimming the head there shifts
/// the cursor and makes a later duplicate substring match instead of the
/// first occurrence.
///
/// Never fails: nodes whose text cannot be located fall back to the current
/// cursor, and anything unrecognized is skipped.
pub fn extract_formatted_text<T: TreeNode>(
    nodes: &[T],
    markup_starts_with_tag: bool,
) -> FormattedText {
    let rendered = inner_text(nodes);
    let trimmed = if markup_starts_with_tag {
        rendered.trim_end()
    } else {
        rendered.trim()
    };
    let text = trimmed.replace('\u{200b}', "");
    if text.is_empty() {
        return FormattedText {
            text,
            entities: None,
        };
    }

    // Realign offsets to the untrimmed rendered text: the cursor starts
    // negative by however many leading bytes were trimmed away.
    let trim_shift = text
        .chars()
        .next()
        .and_then(|first| rendered.find(first))
        .unwrap_or(0);

    let mut extractor = Extractor {
        text: &text,
        cursor: -(trim_shift as i64),
        entities: Vec::new(),
    };
    for node in nodes {
        extractor.walk(node, 1);
    }

    let entities = extractor.entities;
    FormattedText {
        text,
        entities: if entities.is_empty() {
            None
        } else {
            Some(entities)
        },
    }
}

struct Extractor<'t> {
    text: &'t str,
    /// Byte cursor into `text`; negative while still inside the trimmed
    /// leading region.
    cursor: i64,
    entities: Vec<Entity>,
}

impl Extractor<'_> {
    fn walk<T: TreeNode>(&mut self, node: &T, depth: usize) {
        if node.kind() == NodeKind::Comment {
            return;
        }

        let content = node.text_content();
        if let Some((index, entity)) = self.entity_from_node(node, &content) {
            // Children are located inside the entity's own range, so the
            // cursor moves to its start, not past it.
            self.cursor = index;
            self.entities.push(entity);
        } else if !content.is_empty() {
            // A whitespace-only node at the very start contributes nothing;
            // it absorbs leading blank lines.
            if self.cursor == 0 && content.trim().is_empty() {
                return;
            }
            self.cursor += content.len() as i64;
        }

        if depth < MAX_TAG_DEPTH {
            for child in node.children() {
                self.walk(child, depth + 1);
            }
        }
    }

    fn entity_from_node<T: TreeNode>(&self, node: &T, content: &str) -> Option<(i64, Entity)> {
        let kind = entity_kind(node, content)?;
        if content.is_empty() {
            return None;
        }

        let base = floor_char_boundary(self.text, self.cursor.max(0) as usize);
        // A trailing newline trimmed from the text makes the last node's
        // content unfindable; fall back to the cursor position.
        let index = match self.text[base..].find(content) {
            Some(found) => (base + found) as i64,
            None => self.cursor,
        };

        let offset = floor_char_boundary(self.text, index.clamp(0, self.text.len() as i64) as usize);
        let end = floor_char_boundary(self.text, (offset + content.len()).min(self.text.len()));
        if end <= offset {
            return None;
        }

        Some((
            index,
            Entity {
                kind,
                offset,
                length: end - offset,
            },
        ))
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn entity_kind<T: TreeNode>(node: &T, content: &str) -> Option<EntityKind> {
    if node.kind() != NodeKind::Element {
        return None;
    }

    // An explicit marker wins over the tag name.
    if let Some(marker) = node.attr("data-entity-type")
        && let Some(kind) = kind_from_marker(marker, node)
    {
        return Some(kind);
    }

    match node.tag()? {
        "b" | "strong" => Some(EntityKind::Bold),
        "i" | "em" => Some(EntityKind::Italic),
        "u" | "ins" => Some(EntityKind::Underline),
        "s" | "strike" | "del" => Some(EntityKind::Strike),
        "code" => Some(EntityKind::Code),
        "pre" => Some(EntityKind::Pre {
            language: node.attr("data-language").map(str::to_string),
        }),
        "blockquote" => Some(EntityKind::Blockquote {
            can_collapse: node.attr("data-collapsable") == Some("1"),
        }),
        "a" => {
            let href = node.attr("href").unwrap_or_default();
            if href.starts_with("mailto:") {
                Some(EntityKind::Email)
            } else if href.starts_with("tel:") {
                Some(EntityKind::Phone)
            } else if !href.is_empty() && href != content {
                Some(EntityKind::TextUrl {
                    url: href.to_string(),
                })
            } else {
                Some(EntityKind::Url)
            }
        }
        "img" => node
            .attr("data-document-id")
            .map(|id| EntityKind::CustomEmoji {
                document_id: id.to_string(),
            }),
        _ => None,
    }
}

fn kind_from_marker<T: TreeNode>(marker: &str, node: &T) -> Option<EntityKind> {
    Some(match marker {
        "MessageEntityBold" => EntityKind::Bold,
        "MessageEntityItalic" => EntityKind::Italic,
        "MessageEntityUnderline" => EntityKind::Underline,
        "MessageEntityStrike" => EntityKind::Strike,
        "MessageEntityCode" => EntityKind::Code,
        "MessageEntityPre" => EntityKind::Pre {
            language: node.attr("data-language").map(str::to_string),
        },
        "MessageEntityBlockquote" => EntityKind::Blockquote {
            can_collapse: node.attr("data-collapsable") == Some("1"),
        },
        "MessageEntitySpoiler" => EntityKind::Spoiler,
        "MessageEntityUrl" => EntityKind::Url,
        "MessageEntityTextUrl" => EntityKind::TextUrl {
            url: node.attr("href").unwrap_or_default().to_string(),
        },
        "MessageEntityMentionName" => EntityKind::MentionName {
            user_id: node.attr("data-user-id").unwrap_or_default().to_string(),
        },
        "MessageEntityCustomEmoji" => EntityKind::CustomEmoji {
            document_id: node.attr("data-document-id").unwrap_or_default().to_string(),
        },
        "MessageEntityEmail" => EntityKind::Email,
        "MessageEntityPhone" => EntityKind::Phone,
        _ => return None,
    })
}
