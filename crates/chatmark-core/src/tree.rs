/// The capability set the entity extractor needs from a host tree: node kind,
/// tag name, attributes, text content, children. Any DOM-shaped tree can
/// implement it; `DomNode` is the html5ever-backed one.
pub trait TreeNode: Sized {
    fn kind(&self) -> NodeKind;
    /// Lowercase tag name; `None` for non-element nodes.
    fn tag(&self) -> Option<&str>;
    fn attr(&self, name: &str) -> Option<&str>;
    /// Concatenated descendant text, DOM `textContent` style (no synthetic
    /// newlines at block boundaries).
    fn text_content(&self) -> String;
    fn children(&self) -> &[Self];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
}

// Tags that still carry block layout after normalization collapsed the
// composer's divs.
fn is_block_tag(tag: &str) -> bool {
    matches!(tag, "blockquote" | "pre" | "div" | "p")
}

/// DOM `innerText` analogue over the fragment's children: block-level
/// elements force a line break on both sides of their content.
pub fn inner_text<T: TreeNode>(nodes: &[T]) -> String {
    let mut out = String::new();
    for node in nodes {
        inner_text_into(node, &mut out);
    }
    out
}

fn inner_text_into<T: TreeNode>(node: &T, out: &mut String) {
    match node.kind() {
        NodeKind::Text => {
            out.push_str(&node.text_content());
        }
        NodeKind::Element => {
            let block = node.tag().is_some_and(is_block_tag);
            if block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            for child in node.children() {
                inner_text_into(child, out);
            }
            if block && !out.ends_with('\n') {
                out.push('\n');
            }
        }
        NodeKind::Comment => {}
    }
}
