// src/scanner/markdown.rs
// =============================================================================
// This module extracts references from markdown text.
//
// We look for two distinct patterns:
//
// 1. Bare links: the usual [label](https://...) construct (images too).
//    The label may contain nested brackets, escaped brackets, or inline
//    code spans, so the pattern is hairier than you'd expect.
//
// 2. Code-link pairs: a marker line followed by a fenced code block,
//    claiming the block mirrors a line range of the linked source file:
//
//        [_metadata_:link]: https://host/repo/file.rs#L10
//
//        ```rust
//        fn mirrored() {}
//        ```
//
// We deliberately do NOT use a full markdown parser here. These are two
// narrow, line-oriented patterns, and a regex pass per pattern keeps the
// scanner independent of any CommonMark quirks in the surrounding prose.
//
// Rust concepts:
// - Regex captures: Extracting groups out of matches
// - Option<String>: A field that only some findings carry
// =============================================================================

use regex::Regex;
use std::path::{Path, PathBuf};

// A URL restricted to http/https and a fixed allowed character set
// (letters, digits, the '#'..'_' punctuation range, and a few extras,
// including percent-encoded bytes)
const URL: &str = r"https?://(?:[a-zA-Z]|[0-9]|[#-_@.&+]|[!*(),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+";

// One extracted reference, waiting to be verified
//
// `snippet` present = code-link pair, absent = bare link.
// Findings are immutable once produced: the scanner creates them and the
// verifier consumes each exactly once.
#[derive(Debug, Clone)]
pub struct Finding {
    /// The URL to fetch
    pub url: String,
    /// The file the reference was found in (for diagnostics)
    pub origin: PathBuf,
    /// The fenced code body, verbatim, when this is a code-link pair
    pub snippet: Option<String>,
}

impl Finding {
    /// Helper to check whether this finding carries a code snippet
    pub fn is_code_link(&self) -> bool {
        self.snippet.is_some()
    }
}

// Holds the two compiled patterns so we compile them once, not per file
pub struct Scanner {
    link: Regex,
    code_link: Regex,
}

impl Scanner {
    pub fn new() -> Self {
        // Bare link: optional '!' (image), a bracketed label that tolerates
        // one level of nested brackets / escapes / `code spans`, then the URL
        // in parentheses
        let link = format!(r"!?\[(?:\[[^\[\]]*\]|\\[\[\]]?|`[^`]*`|[^\[\]\\])*?\]\(({URL})\)");

        // Code-link pair: the marker, the URL, one or more newlines, then a
        // fenced block with any (or no) language tag. The body is captured
        // lazily so the first closing fence ends the block.
        let code_link = format!(r"\[_metadata_:link\]:\s*({URL})\n+```\S*\n([\s\S]*?)```");

        // The patterns are constants, so a failure to compile is a
        // programmer error, not a runtime condition
        Scanner {
            link: Regex::new(&link).expect("bare link pattern is valid"),
            code_link: Regex::new(&code_link).expect("code-link pattern is valid"),
        }
    }

    // Runs both passes over one document and returns its findings
    //
    // The passes are independent: a URL appearing both as a bare link and as
    // a code-link marker yields two separate findings. Code-link findings
    // come first within a document.
    pub fn scan(&self, text: &str, origin: &Path) -> Vec<Finding> {
        let mut findings = Vec::new();

        for caps in self.code_link.captures_iter(text) {
            findings.push(Finding {
                url: caps[1].to_string(),
                origin: origin.to_path_buf(),
                snippet: Some(caps[2].to_string()),
            });
        }

        for caps in self.link.captures_iter(text) {
            findings.push(Finding {
                url: caps[1].to_string(),
                origin: origin.to_path_buf(),
                snippet: None,
            });
        }

        findings
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why regex instead of a markdown parser?
//    - A markdown parser gives us every CommonMark construct, but we only
//      care about two patterns, one of which ([_metadata_:link] + fence)
//      isn't markdown at all - it's our own convention
//    - Two targeted passes are easier to reason about than parser events
//
// 2. What is captures_iter?
//    - Iterates over every non-overlapping match in the text
//    - caps[0] is the whole match, caps[1] the first (...) group, etc.
//    - Indexing panics only if the group doesn't exist in the pattern,
//      which is a compile-time property of our constant patterns
//
// 3. What is [\s\S] and why not '.'?
//    - '.' doesn't match newlines by default
//    - [\s\S] means "whitespace or not whitespace" = any character at all,
//      which lets the code body span multiple lines
//
// 4. Why does Scanner hold compiled Regex values?
//    - Compiling a regex is much more expensive than running it
//    - The scanner is built once and reused across every input file
// -----------------------------------------------------------------------------
