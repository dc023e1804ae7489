//! Section structure without validation, for editors.
//!
//! Both functions tolerate any input: illegal nesting is followed as
//! written and unmatched closes are ignored.

use crate::error::Span;
use crate::grammar::{classify, LineToken, Tag};
use crate::source::split_lines;
use crate::stack::{Frame, SectionStack};

/// A matched open/close pair. Lines are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRange {
    pub tag: Tag,
    pub open_line: u32,
    pub close_line: u32,
}

fn walk(text: &str, until: Option<u32>, mut on_close: impl FnMut(SectionRange)) -> SectionStack<()> {
    let mut stack = SectionStack::new();
    for line in split_lines(text) {
        if until.is_some_and(|until| line.number >= until) {
            break;
        }
        let token = classify(line.text());
        if stack.top_tag() == Some(Tag::OcamlCode) && !matches!(token, LineToken::Close(_)) {
            continue;
        }
        match token {
            LineToken::Open(open) => stack.push(Frame {
                tag: open.tag,
                line: line.number,
                name_span: Span::default(),
                discarded: false,
                node: (),
            }),
            LineToken::Close(close) => {
                if let Some(closed) = stack.close(close.tag) {
                    on_close(SectionRange {
                        tag: closed.frame.tag,
                        open_line: closed.frame.line,
                        close_line: line.number,
                    });
                }
            }
            LineToken::Malformed(_) | LineToken::Text => {}
        }
    }
    stack
}

/// Sections still open when line `line` is reached, outermost first.
pub fn open_sections_at(text: &str, line: u32) -> Vec<Tag> {
    walk(text, Some(line), |_| {}).iter().map(|f| f.tag).collect()
}

/// Every matched section, ordered by open line.
pub fn section_ranges(text: &str) -> Vec<SectionRange> {
    let mut ranges = Vec::new();
    walk(text, None, |range| ranges.push(range));
    ranges.sort_by_key(|r| r.open_line);
    ranges
}
