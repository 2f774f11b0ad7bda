// src/verifier/extract.rs
// =============================================================================
// This module pulls a line range out of an HTML-rendered source view.
//
// Rendering services show source files as a table with one row per line,
// and give the code cell of line N the id "LCN":
//
//   <tr>
//     <td id="L3" class="line-number">3</td>
//     <td id="LC3" class="blob-code">fn main() {</td>
//   </tr>
//
// To recover lines [start, end) we stream the HTML through the html5ever
// tokenizer (no DOM - a single forward pass) and run a tiny state machine:
//
//   locked   --(td start tag, first attribute value is a wanted LCn)-->  unlocked
//   unlocked --(character tokens)--> append text to the buffer
//   unlocked --(td end tag)--> append '\n', back to locked
//
// Everything else is ignored, which makes the extractor indifferent to
// malformed or unbalanced markup outside the cells we care about.
//
// Rust concepts:
// - Implementing a trait (TokenSink) to receive parser events
// - HashSet for O(1) membership checks
// =============================================================================

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use std::collections::HashSet;
use url::Url;

// A half-open interval of source lines, [start, end)
//
// Derived from a snippet link: `start` comes from the #L<n> fragment and
// `end` from the snippet's newline count, so the range length always equals
// the number of lines the snippet claims to mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    // Computes the claimed range for a code-link finding
    //
    // Returns None when the URL carries no usable line anchor (no fragment,
    // or a fragment that doesn't start with L<digits>). Trailing fragment
    // text after the digits (e.g. the "-L20" of a range anchor) is ignored.
    pub fn from_link(url: &str, snippet: &str) -> Option<LineRange> {
        let parsed = Url::parse(url).ok()?;
        let fragment = parsed.fragment()?;

        let digits: String = fragment
            .strip_prefix('L')?
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let start: usize = digits.parse().ok()?;

        Some(LineRange {
            start,
            end: start + snippet.matches('\n').count(),
        })
    }
}

// The tokenizer sink holding the extraction state machine
//
// Exists for the duration of one parse and is discarded afterwards.
struct LineCellSink {
    /// The "LCn" ids we want, one per line in the range
    wanted: HashSet<String>,
    /// True while we are NOT inside a wanted cell
    locked: bool,
    /// Captured text, one newline-terminated entry per captured cell
    code: String,
}

impl LineCellSink {
    fn new(range: &LineRange) -> Self {
        LineCellSink {
            wanted: (range.start..range.end).map(|n| format!("LC{}", n)).collect(),
            locked: true,
            code: String::new(),
        }
    }

    fn handle_tag(&mut self, tag: Tag) {
        // Only table cells participate in the state machine
        if &*tag.name != "td" {
            return;
        }
        match tag.kind {
            TagKind::StartTag => {
                // The rendering convention puts the line id first; we match
                // the first attribute's value and validate nothing else
                if let Some(attr) = tag.attrs.first() {
                    if self.wanted.contains(&*attr.value) {
                        self.locked = false;
                    }
                }
            }
            TagKind::EndTag => {
                // An end tag only counts as "the" close if we were unlocked,
                // so stray </td> tags elsewhere never touch the buffer
                if !self.locked {
                    self.locked = true;
                    self.code.push('\n');
                }
            }
        }
    }
}

impl TokenSink for LineCellSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => self.handle_tag(tag),
            Token::CharacterTokens(text) => {
                // The tokenizer hands us decoded text (entities resolved)
                if !self.locked {
                    self.code.push_str(&text);
                }
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

// Extracts the text of `range` from an HTML source view
//
// Pure text transform: no network, no shared state. The output is the
// concatenation of the captured cells in document order, each terminated
// by a newline. Lines missing from the page are simply not captured -
// the caller detects that as a textual mismatch.
pub fn extract_lines(html: &str, range: &LineRange) -> String {
    let sink = LineCellSink::new(range);

    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from_slice(html));

    let mut tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();

    tokenizer.sink.code
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why the tokenizer instead of a DOM?
//    - We only need tag open/close events and text, in document order
//    - A DOM would cost a full tree build and lose first-attribute ordering
//    - The tokenizer is the same engine DOM crates like scraper sit on top of
//
// 2. What is a TokenSink?
//    - html5ever pushes tokens (tags, text, comments) into a sink you supply
//    - Our sink is the whole extractor: three fields of state, two rules
//
// 3. What is StrTendril?
//    - html5ever's cheap shared string type
//    - from_slice copies our &str into the tokenizer's input queue
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // Builds a source view with `rows` lines, shaped like the real thing:
    // a number cell (id "Ln") followed by a code cell (id "LCn") per row
    fn line_table(rows: usize) -> String {
        let mut html = String::from("<html><body><table>");
        for n in 1..=rows {
            html.push_str(&format!(
                "<tr><td id=\"L{n}\" class=\"line-number\">{n}</td>\
                 <td id=\"LC{n}\" class=\"blob-code\">line {n}</td></tr>"
            ));
        }
        html.push_str("</table></body></html>");
        html
    }

    #[test]
    fn test_extracts_exactly_the_requested_range() {
        let html = line_table(10);
        let out = extract_lines(&html, &LineRange { start: 3, end: 6 });
        assert_eq!(out, "line 3\nline 4\nline 5\n");
    }

    #[test]
    fn test_extraction_is_pure() {
        let html = line_table(10);
        let range = LineRange { start: 2, end: 4 };
        assert_eq!(extract_lines(&html, &range), extract_lines(&html, &range));
    }

    #[test]
    fn test_single_line_range() {
        let html = line_table(5);
        let out = extract_lines(&html, &LineRange { start: 5, end: 6 });
        assert_eq!(out, "line 5\n");
    }

    #[test]
    fn test_empty_range_captures_nothing() {
        let html = line_table(5);
        let out = extract_lines(&html, &LineRange { start: 3, end: 3 });
        assert_eq!(out, "");
    }

    #[test]
    fn test_nested_tags_inside_cell_are_transparent() {
        let html = r#"<table><tr>
            <td id="LC1"><span class="kw">fn</span> <span>main</span>()</td>
        </tr></table>"#;
        let out = extract_lines(html, &LineRange { start: 1, end: 2 });
        assert_eq!(out, "fn main()\n");
    }

    #[test]
    fn test_entities_are_decoded() {
        let html = r#"<table><tr><td id="LC1">a &lt; b &amp;&amp; c &gt; d</td></tr></table>"#;
        let out = extract_lines(html, &LineRange { start: 1, end: 2 });
        assert_eq!(out, "a < b && c > d\n");
    }

    #[test]
    fn test_stray_end_tags_do_not_leak_into_the_buffer() {
        // The </td> before the wanted cell arrives while locked and must
        // not emit a separator, and the non-wanted trailing cell stays
        // invisible even though it is never closed
        let html = r#"</td><p>noise</p><table>
            <td id="LC1">wanted</td>
            <td id="LC9">never closed"#;
        let out = extract_lines(html, &LineRange { start: 1, end: 2 });
        assert_eq!(out, "wanted\n");
    }

    #[test]
    fn test_cells_without_attributes_are_ignored() {
        let html = r#"<table><tr><td>plain</td><td id="LC2">kept</td></tr></table>"#;
        let out = extract_lines(html, &LineRange { start: 2, end: 3 });
        assert_eq!(out, "kept\n");
    }

    #[test]
    fn test_missing_lines_shorten_the_output() {
        // Requesting [4, 7) from a 5-line page captures lines 4 and 5 only;
        // the caller sees the shortfall as a mismatch, not an error
        let html = line_table(5);
        let out = extract_lines(&html, &LineRange { start: 4, end: 7 });
        assert_eq!(out, "line 4\nline 5\n");
    }

    #[test]
    fn test_line_range_from_anchor() {
        // Two newlines in the snippet = two claimed lines
        let range = LineRange::from_link("http://x/y#L10", "foo\nbar\n").unwrap();
        assert_eq!(range, LineRange { start: 10, end: 12 });
    }

    #[test]
    fn test_line_range_ignores_trailing_anchor_text() {
        let range = LineRange::from_link("https://h/f.rs#L10-L20", "a\n").unwrap();
        assert_eq!(range, LineRange { start: 10, end: 11 });
    }

    #[test]
    fn test_line_range_requires_an_anchor() {
        assert!(LineRange::from_link("https://h/f.rs", "a\n").is_none());
        assert!(LineRange::from_link("https://h/f.rs#section", "a\n").is_none());
        assert!(LineRange::from_link("https://h/f.rs#L", "a\n").is_none());
        assert!(LineRange::from_link("not a url", "a\n").is_none());
    }
}
