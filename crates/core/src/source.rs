//! Line model for ICS source text.
//!
//! The grammar is line-oriented: every token, key and diagnostic is located
//! by a 1-based line number and a character span within that line. Tokens are
//! matched against the trimmed line; spans are reported against the raw line
//! so editors can underline the exact text.

use crate::error::Span;
use std::ops::Range;

/// One physical line of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number.
    pub number: u32,
    /// The line without its terminator, untrimmed.
    pub raw: &'a str,
}

impl<'a> SourceLine<'a> {
    pub fn new(number: u32, raw: &'a str) -> Self {
        SourceLine { number, raw }
    }

    /// The line with surrounding whitespace removed.
    pub fn text(&self) -> &'a str {
        self.raw.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.text().is_empty()
    }

    /// Number of characters before the trimmed text starts.
    fn indent(&self) -> u32 {
        self.raw.chars().take_while(|c| c.is_whitespace()).count() as u32
    }

    /// Convert a byte range of [`text`](Self::text) into a character span
    /// of the raw line.
    pub fn span_of(&self, range: Range<usize>) -> Span {
        let text = self.text();
        let start = range.start.min(text.len());
        let end = range.end.clamp(start, text.len());
        let indent = self.indent();
        let start_col = indent + text[..start].chars().count() as u32;
        let end_col = start_col + text[start..end].chars().count() as u32;
        Span::new(start_col, end_col)
    }

    /// Span covering the trimmed text of the line.
    pub fn full_span(&self) -> Span {
        self.span_of(0..self.text().len())
    }
}

/// Split a document into numbered lines. Handles `\n` and `\r\n`.
pub fn split_lines(text: &str) -> Vec<SourceLine<'_>> {
    text.lines()
        .enumerate()
        .map(|(i, raw)| SourceLine::new(i as u32 + 1, raw))
        .collect()
}

/// Join the raw lines of a verbatim body, dropping leading and trailing
/// blank lines but keeping indentation.
pub fn verbatim(lines: &[SourceLine<'_>]) -> String {
    let first = lines.iter().position(|l| !l.is_blank());
    let last = lines.iter().rposition(|l| !l.is_blank());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last]
            .iter()
            .map(|l| l.raw.trim_end())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}
