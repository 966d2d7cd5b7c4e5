use chatmark_core::rewrite_markdown;

const SPOILER_OPEN: &str = r#"<span data-entity-type="MessageEntitySpoiler">"#;
const QUOTE_OPEN: &str = r#"<blockquote data-entity-type="MessageEntityBlockquote">"#;
const EXPANDABLE_OPEN: &str =
    r#"<blockquote data-collapsable="1" data-entity-type="MessageEntityBlockquote">"#;

#[test]
fn plain_text_passes_through() {
    assert_eq!(rewrite_markdown("hello world"), "hello world");
    assert_eq!(rewrite_markdown(""), "");
}

#[test]
fn basic_pairs() {
    assert_eq!(rewrite_markdown("**bold**"), "<b>bold</b>");
    assert_eq!(rewrite_markdown("__italic__"), "<i>italic</i>");
    assert_eq!(rewrite_markdown("~~strike~~"), "<s>strike</s>");
    assert_eq!(rewrite_markdown("`code`"), "<code>code</code>");
    assert_eq!(
        rewrite_markdown("||secret||"),
        format!("{SPOILER_OPEN}secret</span>")
    );
}

#[test]
fn nested_pairs() {
    assert_eq!(rewrite_markdown("**__both__**"), "<b><i>both</i></b>");
    assert_eq!(
        rewrite_markdown("**a __b__ c**"),
        "<b>a <i>b</i> c</b>"
    );
}

#[test]
fn crossing_spans_close_and_reopen() {
    // Bold closes while strike is still open: the scanner closes the strike,
    // closes the bold, then reopens the strike so the output nests.
    assert_eq!(
        rewrite_markdown("**a ~~b**c~~"),
        "<b>a <s>b</s></b><s>c</s>"
    );
}

#[test]
fn backslash_escapes_markers() {
    assert_eq!(rewrite_markdown(r"\*\*not bold\*\*"), "**not bold**");
    assert_eq!(rewrite_markdown(r"a\`b"), "a`b");
    // A trailing backslash is just a backslash.
    assert_eq!(rewrite_markdown(r"tail\"), r"tail\");
}

#[test]
fn unterminated_markers_revert_to_literal_text() {
    assert_eq!(rewrite_markdown("**unterminated"), "**unterminated");
    assert_eq!(rewrite_markdown("||unterminated"), "||unterminated");
    assert_eq!(rewrite_markdown("**a __b"), "**a __b");
}

#[test]
fn code_admits_no_nested_markdown() {
    assert_eq!(
        rewrite_markdown("`**not bold**`"),
        "<code>**not bold**</code>"
    );
}

#[test]
fn code_breaks_on_newline() {
    // The span is abandoned and the open marker comes back literally; the
    // lone backtick at the end stays unpaired too.
    assert_eq!(rewrite_markdown("`a\nb`"), "`a\nb`");
}

#[test]
fn single_line_quote_closes_on_newline() {
    assert_eq!(
        rewrite_markdown("&gt;&gt;a\nb"),
        format!("{QUOTE_OPEN}a</blockquote>b")
    );
}

#[test]
fn consecutive_quote_lines_merge() {
    assert_eq!(
        rewrite_markdown("&gt;&gt;a\n&gt;&gt;b"),
        format!("{QUOTE_OPEN}a\nb</blockquote>")
    );
}

#[test]
fn quote_open_at_end_of_input_closes() {
    assert_eq!(
        rewrite_markdown("&gt;&gt;quote"),
        format!("{QUOTE_OPEN}quote</blockquote>")
    );
}

#[test]
fn expandable_quote_closes_before_newline() {
    assert_eq!(
        rewrite_markdown("**&gt;hidden||\n"),
        format!("{EXPANDABLE_OPEN}hidden</blockquote>\n")
    );
    assert_eq!(
        rewrite_markdown("**&gt;hidden||"),
        format!("{EXPANDABLE_OPEN}hidden</blockquote>")
    );
}

#[test]
fn bare_double_pipe_inside_expandable_quote_is_a_spoiler() {
    assert_eq!(
        rewrite_markdown("**&gt;a||b||\n"),
        format!("{EXPANDABLE_OPEN}a{SPOILER_OPEN}b</span></blockquote>||\n")
    );
}

#[test]
fn quote_marks_inside_expandable_quote_are_swallowed() {
    assert_eq!(
        rewrite_markdown("**&gt;x&gt;&gt;y||\n"),
        format!("{EXPANDABLE_OPEN}xy</blockquote>\n")
    );
}

#[test]
fn fenced_code_with_language_tag() {
    assert_eq!(
        rewrite_markdown("```rust\ncode```"),
        r#"<pre data-language="rust">code</pre>"#
    );
    assert_eq!(
        rewrite_markdown("```\ncode```"),
        "<pre>\ncode</pre>"
    );
}

#[test]
fn block_markup_collapses_to_newlines() {
    assert_eq!(rewrite_markdown("a<br>b"), "a\nb");
    assert_eq!(rewrite_markdown("a<div><br></div>b"), "a\nb");
    assert_eq!(rewrite_markdown("a&nbsp;b"), "a b");
}
