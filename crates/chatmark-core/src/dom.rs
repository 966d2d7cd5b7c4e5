use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{ParseOpts, QualName, local_name, namespace_url, ns};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::tree::{NodeKind, TreeNode};

/// Owned DOM fragment node, detached from the html5ever rc-tree so the
/// extractor can borrow it freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomNode {
    Element(DomElement),
    Text(String),
    Comment(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomElement {
    /// Lowercase tag name.
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<DomNode>,
}

impl DomElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl TreeNode for DomNode {
    fn kind(&self) -> NodeKind {
        match self {
            DomNode::Element(_) => NodeKind::Element,
            DomNode::Text(_) => NodeKind::Text,
            DomNode::Comment(_) => NodeKind::Comment,
        }
    }

    fn tag(&self) -> Option<&str> {
        match self {
            DomNode::Element(el) => Some(&el.tag),
            _ => None,
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        match self {
            DomNode::Element(el) => el.attr(name),
            _ => None,
        }
    }

    fn text_content(&self) -> String {
        match self {
            DomNode::Text(text) => text.clone(),
            DomNode::Comment(_) => String::new(),
            DomNode::Element(el) => {
                let mut out = String::new();
                for child in &el.children {
                    out.push_str(&child.text_content());
                }
                out
            }
        }
    }

    fn children(&self) -> &[Self] {
        match self {
            DomNode::Element(el) => &el.children,
            _ => &[],
        }
    }
}

/// Parses an HTML string as a fragment in a `div` context and returns the
/// fragment's child nodes, with image carriers already fixed up.
pub fn parse_fragment(html: &str) -> Vec<DomNode> {
    let dom = html5ever::parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        QualName::new(None, ns!(html), local_name!("div")),
        Vec::new(),
    )
    .one(StrTendril::from(html));

    // Fragment parsing wraps the content in a synthetic <html> element.
    let document = dom.document.children.borrow();
    let mut nodes = document
        .iter()
        .find(|child| matches!(child.data, NodeData::Element { .. }))
        .map(|root| convert_children(root))
        .unwrap_or_default();
    fix_image_content(&mut nodes);
    nodes
}

fn convert_children(handle: &Handle) -> Vec<DomNode> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(convert)
        .collect()
}

fn convert(handle: &Handle) -> Option<DomNode> {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => Some(DomNode::Element(DomElement {
            tag: name.local.to_string(),
            attrs: attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect(),
            children: convert_children(handle),
        })),
        NodeData::Text { contents } => Some(DomNode::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(DomNode::Comment(contents.to_string())),
        _ => None,
    }
}

/// Restores emoji images to text: a custom-emoji carrier
/// (`img[data-document-id]`) keeps its node but gains its alt text as
/// content, so it still yields a CustomEmoji entity; a plain fallback image
/// is replaced by its alt text outright.
pub fn fix_image_content(nodes: &mut Vec<DomNode>) {
    for node in nodes.iter_mut() {
        let DomNode::Element(el) = node else { continue };
        fix_image_content(&mut el.children);
        if el.tag != "img" {
            continue;
        }
        let alt = el.attr("alt").unwrap_or_default().to_string();
        if el.attr("data-document-id").is_some() {
            el.children = vec![DomNode::Text(alt)];
        } else {
            *node = DomNode::Text(alt);
        }
    }
}
