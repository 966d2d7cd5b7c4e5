mod dom;
mod entity;
mod extract;
mod markdown;
mod normalize;
mod parse;
mod tree;

pub use dom::{DomElement, DomNode, fix_image_content, parse_fragment};
pub use entity::{Entity, EntityKind, FormattedText};
pub use extract::{MAX_TAG_DEPTH, extract_formatted_text};
pub use markdown::rewrite_markdown;
pub use normalize::{escape_html_text, normalize_html, rewrite_markdown_links};
pub use parse::{ParseOptions, parse_formatted_text, parse_html_as_formatted_text};
pub use tree::{NodeKind, TreeNode, inner_text};
