use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::normalize_html;

/// `>` as it appears in composer innerHTML text.
const QUOTE_MARK: &str = "&gt;&gt;";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    ExpandableQuote,
    Spoiler,
    Bold,
    Italic,
    Strike,
    Pre,
    Code,
    SingleQuote,
}

struct MarkerDef {
    marker: Marker,
    open: &'static str,
    close: &'static str,
    breaks: &'static [&'static str],
    tag_open: &'static str,
    tag_close: &'static str,
}

const MARKER_COUNT: usize = 8;

// Priority order: first match wins at each position. The expandable quote
// must come before the spoiler so `**&gt;` is not read as bold, and its `||`
// close can fall through to the spoiler rule.
static MARKERS: [MarkerDef; MARKER_COUNT] = [
    MarkerDef {
        marker: Marker::ExpandableQuote,
        open: "**&gt;",
        close: "||",
        breaks: &[],
        tag_open: r#"<blockquote data-collapsable="1" data-entity-type="MessageEntityBlockquote">"#,
        tag_close: "</blockquote>",
    },
    MarkerDef {
        marker: Marker::Spoiler,
        open: "||",
        close: "||",
        breaks: &[],
        tag_open: r#"<span data-entity-type="MessageEntitySpoiler">"#,
        tag_close: "</span>",
    },
    MarkerDef {
        marker: Marker::Bold,
        open: "**",
        close: "**",
        breaks: &[],
        tag_open: "<b>",
        tag_close: "</b>",
    },
    MarkerDef {
        marker: Marker::Italic,
        open: "__",
        close: "__",
        breaks: &[],
        tag_open: "<i>",
        tag_close: "</i>",
    },
    MarkerDef {
        marker: Marker::Strike,
        open: "~~",
        close: "~~",
        breaks: &[],
        tag_open: "<s>",
        tag_close: "</s>",
    },
    MarkerDef {
        marker: Marker::Pre,
        open: "```",
        close: "```",
        breaks: &[],
        tag_open: "<pre>",
        tag_close: "</pre>",
    },
    MarkerDef {
        marker: Marker::Code,
        open: "`",
        close: "`",
        // An inline code span cannot span lines; the open marker reverts to
        // literal text when the line ends first.
        breaks: &["\n"],
        tag_open: "<code>",
        tag_close: "</code>",
    },
    MarkerDef {
        marker: Marker::SingleQuote,
        open: QUOTE_MARK,
        close: "\n",
        breaks: &[],
        tag_open: r#"<blockquote data-entity-type="MessageEntityBlockquote">"#,
        tag_close: "</blockquote>",
    },
];

const EXPANDABLE_QUOTE: usize = 0;

static PRE_LANGUAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<pre>([a-zA-Z0-9+#]+)[\r\n]+(.+?)</pre>").unwrap());

/// Rewrites inline Markdown markers in composer innerHTML into their HTML tag
/// equivalents. Input and output are innerHTML-escaped strings; block
/// structure is collapsed to `\n` first. Unpaired markers come back out as
/// literal text, so the result never contains an unbalanced tag.
pub fn rewrite_markdown(html: &str) -> String {
    let normalized = normalize_html(html);
    let mut rewriter = Rewriter::new(&normalized);
    rewriter.scan();
    let out = rewriter.finish();
    PRE_LANGUAGE_RE
        .replace_all(&out, r#"<pre data-language="$1">$2</pre>"#)
        .into_owned()
}

/// Single-pass scanner. All state is local to one call, so concurrent parses
/// cannot interfere through a shared descriptor table.
struct Rewriter<'a> {
    src: &'a str,
    out: String,
    /// Indices into MARKERS, innermost last.
    stack: Vec<usize>,
    open: [bool; MARKER_COUNT],
    /// Byte position in `out` of the last emitted open tag per marker, kept
    /// current so an abandoned span can be reverted to its literal marker.
    open_pos: [usize; MARKER_COUNT],
}

impl<'a> Rewriter<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            out: String::with_capacity(src.len()),
            stack: Vec::new(),
            open: [false; MARKER_COUNT],
            open_pos: [0; MARKER_COUNT],
        }
    }

    fn finish(self) -> String {
        debug_assert!(self.stack.is_empty());
        self.out
    }

    fn scan(&mut self) {
        let src = self.src;
        let mut i = 0;
        'src: while i < src.len() {
            let rest = &src[i..];

            // Backslash escape: emit the next char verbatim.
            if let Some(escaped) = rest.strip_prefix('\\')
                && let Some(ch) = escaped.chars().next()
            {
                self.out.push(ch);
                i += 1 + ch.len_utf8();
                continue;
            }

            // `>>` inside an open expandable quote is quoted text, not a
            // nested single-line quote.
            if self.open[EXPANDABLE_QUOTE] && rest.starts_with(QUOTE_MARK) {
                i += QUOTE_MARK.len();
                continue;
            }

            for (idx, def) in MARKERS.iter().enumerate() {
                if self.open[idx] {
                    if rest.starts_with(def.close) {
                        let after = &src[i + def.close.len()..];
                        match def.marker {
                            // Consecutive `>>` lines merge into one quote.
                            Marker::SingleQuote if after.starts_with(def.open) => {
                                self.out.push('\n');
                                i += def.close.len() + def.open.len();
                                continue 'src;
                            }
                            // An expandable quote only closes at `||` + end of
                            // line; anywhere else the `||` is a spoiler marker
                            // and the next descriptor picks it up.
                            Marker::ExpandableQuote
                                if !(after.is_empty() || after.starts_with('\n')) =>
                            {
                                continue;
                            }
                            _ => {}
                        }
                        self.close_marker(idx);
                        i += def.close.len();
                        continue 'src;
                    }
                    for brk in def.breaks {
                        if rest.starts_with(brk) {
                            // The span is abandoned unterminated; the break
                            // character itself is left for the other
                            // descriptors and the verbatim copy.
                            self.abandon_marker(idx);
                            break;
                        }
                    }
                } else if rest.starts_with(def.open) {
                    // Code spans admit no nested markdown.
                    if self.innermost() == Some(Marker::Code) {
                        continue;
                    }
                    self.open_marker(idx);
                    i += def.open.len();
                    continue 'src;
                }
            }

            let ch = rest.chars().next().expect("non-empty rest");
            self.out.push(ch);
            i += ch.len_utf8();
        }

        self.unwind();
    }

    fn innermost(&self) -> Option<Marker> {
        self.stack.last().map(|&idx| MARKERS[idx].marker)
    }

    fn open_marker(&mut self, idx: usize) {
        self.stack.push(idx);
        self.open[idx] = true;
        self.open_pos[idx] = self.out.len();
        self.out.push_str(MARKERS[idx].tag_open);
    }

    fn close_marker(&mut self, idx: usize) {
        let def = &MARKERS[idx];
        if self.stack.last() == Some(&idx) {
            self.stack.pop();
            self.open[idx] = false;
            self.out.push_str(def.tag_close);
            return;
        }

        // Crossing spans: the closed marker is not innermost. Close every
        // marker above it, close the target, then re-open the others in the
        // same relative order so the emitted HTML nests properly while the
        // author's overlapping ranges survive as entities.
        let pos = self
            .stack
            .iter()
            .position(|&m| m == idx)
            .expect("open marker is on the stack");
        for j in (pos + 1..self.stack.len()).rev() {
            self.out.push_str(MARKERS[self.stack[j]].tag_close);
        }
        self.out.push_str(def.tag_close);
        for j in pos + 1..self.stack.len() {
            let m = self.stack[j];
            self.open_pos[m] = self.out.len();
            self.out.push_str(MARKERS[m].tag_open);
        }
        self.stack.remove(pos);
        self.open[idx] = false;
    }

    /// Force-close without a close tag: the emitted open tag reverts to the
    /// literal marker text, as if the span had never opened.
    fn abandon_marker(&mut self, idx: usize) {
        if let Some(pos) = self.stack.iter().position(|&m| m == idx) {
            self.stack.remove(pos);
        }
        self.open[idx] = false;
        self.revert_open_tag(idx);
    }

    fn revert_open_tag(&mut self, idx: usize) {
        let def = &MARKERS[idx];
        let start = self.open_pos[idx];
        let end = start + def.tag_open.len();
        debug_assert!(self.out.is_char_boundary(start) && end <= self.out.len());
        self.out.replace_range(start..end, def.open);
        // Recorded positions after the edit move with it.
        for m in 0..MARKER_COUNT {
            if self.open[m] && self.open_pos[m] > start {
                self.open_pos[m] = self.open_pos[m] - def.tag_open.len() + def.open.len();
            }
        }
    }

    /// End-of-input: whatever is still open is unpaired. A single-line quote
    /// closes implicitly (its close marker is the line end); everything else
    /// reverts to literal marker text.
    fn unwind(&mut self) {
        while let Some(idx) = self.stack.pop() {
            if MARKERS[idx].marker == Marker::SingleQuote {
                self.out.push_str(MARKERS[idx].tag_close);
                self.open[idx] = false;
                continue;
            }
            self.revert_open_tag(idx);
            self.open[idx] = false;
        }
    }
}
