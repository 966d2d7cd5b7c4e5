use crate::dom::parse_fragment;
use crate::entity::FormattedText;
use crate::extract::extract_formatted_text;
use crate::markdown::rewrite_markdown;
use crate::normalize::rewrite_markdown_links;

#[derive(Clone, Copy, Debug, Default)]
pub struct ParseOptions {
    /// Also rewrite `[label](url)` into links before the markdown pass.
    pub with_markdown_links: bool,
    /// Take the HTML as-is, without the markdown rewrite.
    pub skip_markdown: bool,
}

/// Converts composer innerHTML (or escaped Markdown-flavored text) into the
/// plain message text plus its formatting entities.
///
/// Total over its input: malformed or unpaired markup degrades to literal
/// text, and empty input yields an empty `FormattedText`.
pub fn parse_html_as_formatted_text(html: &str, options: &ParseOptions) -> FormattedText {
    let rewritten = if options.skip_markdown {
        html.to_string()
    } else if options.with_markdown_links {
        rewrite_markdown(&rewrite_markdown_links(html))
    } else {
        rewrite_markdown(html)
    };

    let nodes = parse_fragment(&rewritten);
    extract_formatted_text(&nodes, rewritten.starts_with('<'))
}

/// `parse_html_as_formatted_text` with default options.
pub fn parse_formatted_text(html: &str) -> FormattedText {
    parse_html_as_formatted_text(html, &ParseOptions::default())
}
