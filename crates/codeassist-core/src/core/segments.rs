//! Splits message text into prose and fenced code segments.

use std::sync::LazyLock;

use regex::Regex;

/// Opening fence, optional language tag, newline, lazily matched body,
/// newline, closing fence.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([A-Za-z0-9]*)\n(.*?)\n```").expect("FENCE_RE is a valid static regex pattern")
});

/// Language used when a fence carries no tag.
pub const DEFAULT_LANGUAGE: &str = "text";

/// A contiguous piece of message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text, kept verbatim.
    Prose(String),
    /// The body of a fenced block.
    CodeBlock { language: String, code: String },
}

impl Segment {
    /// Renders the segment back to Markdown.
    pub fn to_markdown(&self) -> String {
        match self {
            Segment::Prose(text) => text.clone(),
            Segment::CodeBlock { language, code } => format!("```{language}\n{code}\n```"),
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Segment::CodeBlock { .. })
    }
}

/// Splits `text` into an ordered list of segments.
///
/// Text between fences becomes `Prose` when it holds any non-whitespace;
/// whitespace-only gaps are dropped. An unterminated fence stays prose.
pub fn segments(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut cursor = 0;

    for caps in FENCE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_prose(&mut out, &text[cursor..whole.start()]);

        let language = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|tag| !tag.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE);
        let code = caps.get(2).map_or("", |m| m.as_str());
        out.push(Segment::CodeBlock {
            language: language.to_string(),
            code: code.to_string(),
        });

        cursor = whole.end();
    }

    push_prose(&mut out, &text[cursor..]);
    out
}

fn push_prose(out: &mut Vec<Segment>, gap: &str) {
    if !gap.trim().is_empty() {
        out.push(Segment::Prose(gap.to_string()));
    }
}
