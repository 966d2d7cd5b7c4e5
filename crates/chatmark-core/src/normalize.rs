use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;

static DIV_BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<div><br[^>]*></div>").unwrap());
static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br[^>]*>").unwrap());
static CUSTOM_EMOJI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]\n]+)\]\(customEmoji:(\d+)\)").unwrap());
static MD_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\[([^\]]+?)\]\((",
        r"(?:(?:ftp|https?)://)?(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z]{2,63}",
        r"[-a-zA-Z0-9@:%_+.~#?&/=]*",
        r")\)",
    ))
    .unwrap()
});

/// Collapses the block structure of composer innerHTML into literal newlines
/// and rewrites custom-emoji markdown into `<img>` carriers, so the markdown
/// scanner and the fragment parser only ever see inline markup.
pub fn normalize_html(html: &str) -> String {
    let html = html.replace("&nbsp;", " ");
    // <div><br></div> is a blank line in Safari, a bare <br> everywhere else.
    let html = DIV_BR_RE.replace_all(&html, "\n");
    let html = BR_RE.replace_all(&html, "\n");
    // <blockquote><div>x</div></blockquote> => <blockquote>\nx</blockquote>.
    // Collapsing the `</div><div>` pair in one step is wrong: it swallows
    // blank lines after a spoiler span.
    let html = html.replace("<div>", "\n").replace("</div>", "");
    rewrite_custom_emoji(&html)
}

/// `[alt](customEmoji:ID)` => `<img alt="alt" data-document-id="ID">`, except
/// directly inside an open `<code>`/`<pre>` element.
fn rewrite_custom_emoji(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for caps in CUSTOM_EMOJI_RE.captures_iter(html) {
        let m = caps.get(0).expect("whole match");
        if in_code_or_pre(&html[m.end()..]) {
            continue;
        }
        out.push_str(&html[last..m.start()]);
        let _ = write!(
            out,
            r#"<img alt="{}" data-document-id="{}">"#,
            &caps[1], &caps[2]
        );
        last = m.end();
    }
    out.push_str(&html[last..]);
    out
}

// True when the very next tag after this position is a code/pre close, i.e.
// the position sits inside that element's text.
fn in_code_or_pre(rest: &str) -> bool {
    match rest.find('<') {
        Some(i) => rest[i..].starts_with("</code>") || rest[i..].starts_with("</pre>"),
        None => false,
    }
}

/// `[label](link)` => `<a href="...">label</a>` for link-shaped targets.
/// Scheme-less links get `https://`, bare addresses get `mailto:`.
pub fn rewrite_markdown_links(html: &str) -> String {
    MD_LINK_RE
        .replace_all(html, |caps: &regex::Captures| {
            let label = &caps[1];
            let link = &caps[2];
            let url = if link.contains("://") {
                link.to_string()
            } else if link.contains('@') {
                format!("mailto:{link}")
            } else {
                format!("https://{link}")
            };
            format!(r#"<a href="{url}">{label}</a>"#)
        })
        .into_owned()
}

/// Escapes raw text the way a contenteditable composer would, so plain
/// Markdown-flavored text can be fed through the HTML pipeline.
pub fn escape_html_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_divs_and_brs() {
        assert_eq!(normalize_html("a<div><br></div>b"), "a\nb");
        assert_eq!(normalize_html("a<br>b<br/>c"), "a\nb\nc");
        assert_eq!(normalize_html("<div>a</div><div>b</div>"), "\na\nb");
        assert_eq!(normalize_html("a&nbsp;b"), "a b");
    }

    #[test]
    fn rewrites_custom_emoji_outside_code() {
        assert_eq!(
            normalize_html("hi [😀](customEmoji:42)"),
            r#"hi <img alt="😀" data-document-id="42">"#
        );
        assert_eq!(
            normalize_html("<code>[x](customEmoji:1)</code>"),
            "<code>[x](customEmoji:1)</code>"
        );
    }

    #[test]
    fn autolinks_markdown_links() {
        assert_eq!(
            rewrite_markdown_links("[site](example.com)"),
            r#"<a href="https://example.com">site</a>"#
        );
        assert_eq!(
            rewrite_markdown_links("[mail](user@example.com)"),
            r#"<a href="mailto:user@example.com">mail</a>"#
        );
        assert_eq!(
            rewrite_markdown_links("[x](https://example.com/a?b=1)"),
            r#"<a href="https://example.com/a?b=1">x</a>"#
        );
    }

    #[test]
    fn escapes_text() {
        assert_eq!(escape_html_text(">>a & <b>"), "&gt;&gt;a &amp; &lt;b&gt;");
    }
}
