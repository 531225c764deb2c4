//! Submission text handling.
//!
//! Graders accept either a plain text blob or a split
//! `{thinking, output}` pair. A plain blob may itself carry
//! `<thinking>`/`<output>` markers, which are honored when the length
//! penalty needs to count only one segment.

use std::borrow::Cow;

const THINKING_OPEN: &str = "<thinking>";
const THINKING_CLOSE: &str = "</thinking>";
const OUTPUT_OPEN: &str = "<output>";
const OUTPUT_CLOSE: &str = "</output>";

/// Text under evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeInput {
    /// A single blob, optionally containing thinking/output markers.
    Text(String),
    /// Pre-split reasoning and answer sections.
    Split { thinking: String, output: String },
}

impl GradeInput {
    pub fn pair(thinking: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Split {
            thinking: thinking.into(),
            output: output.into(),
        }
    }

    /// The `(thinking, output)` segments used for length counting.
    pub fn segments(&self) -> (&str, &str) {
        match self {
            Self::Text(text) => parse_thinking_output(text),
            Self::Split { thinking, output } => (thinking.as_str(), output.as_str()),
        }
    }

    /// The text presented to the judge. Split input is reassembled into
    /// marker form so the judge sees both sections; plain text passes
    /// through untouched.
    pub fn judged_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text.as_str()),
            Self::Split { thinking, output } => {
                let mut parts = Vec::new();
                if !thinking.is_empty() {
                    parts.push(format!("{THINKING_OPEN}{thinking}{THINKING_CLOSE}"));
                }
                if !output.is_empty() {
                    parts.push(format!("{OUTPUT_OPEN}{output}{OUTPUT_CLOSE}"));
                }
                Cow::Owned(parts.join("\n"))
            }
        }
    }
}

impl From<&str> for GradeInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for GradeInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Split a blob into `(thinking, output)` segments.
///
/// The first `<thinking>` and `<output>` blocks win. Without an output
/// marker, the output is whatever follows the thinking block; without any
/// markers, the whole text is output. Unclosed blocks extend to the end
/// of the text. Segments come back trimmed.
pub fn parse_thinking_output(text: &str) -> (&str, &str) {
    let thinking = extract_block(text, THINKING_OPEN, THINKING_CLOSE);

    let output = if let Some(block) = find_block(text, OUTPUT_OPEN, OUTPUT_CLOSE) {
        block
    } else if let Some(open) = text.find(THINKING_OPEN) {
        match text[open..].find(THINKING_CLOSE) {
            Some(close) => &text[open + close + THINKING_CLOSE.len()..],
            None => "",
        }
    } else {
        text
    };

    (thinking.trim(), output.trim())
}

fn extract_block<'a>(text: &'a str, open: &str, close: &str) -> &'a str {
    find_block(text, open, close).unwrap_or("")
}

fn find_block<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = text.find(open)? + open.len();
    match text[start..].find(close) {
        Some(end) => Some(&text[start..start + end]),
        None => Some(&text[start..]),
    }
}

/// Whitespace-delimited token count, the default length measure.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
