//! `step N` mentions in prose, checked against the problem's steps.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Diagnostic, DiagnosticKind, Span};
use crate::source::SourceLine;

use super::steps::STEP_MARKER;

static STEP_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bstep\s+(\d+)\b").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepMention {
    pub line: u32,
    /// Covers the whole `step N` text.
    pub span: Span,
    /// `u64::MAX` when the digits overflow.
    pub step: u64,
}

/// Find `step N` mentions. With `skip_step_markers`, a leading `step N:`
/// marker is not itself a mention.
pub fn collect_step_mentions(lines: &[SourceLine<'_>], skip_step_markers: bool) -> Vec<StepMention> {
    let mut mentions = Vec::new();
    for line in lines {
        let text = line.text();
        let offset = if skip_step_markers {
            STEP_MARKER
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map_or(0, |m| m.start())
        } else {
            0
        };
        for caps in STEP_MENTION.captures_iter(&text[offset..]) {
            let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            mentions.push(StepMention {
                line: line.number,
                span: line.span_of(offset + whole.start()..offset + whole.end()),
                step: digits.as_str().parse().unwrap_or(u64::MAX),
            });
        }
    }
    mentions
}

/// Warn about every mention that does not name one of `step_count` steps.
pub fn check_step_mentions(
    mentions: &[StepMention],
    step_count: usize,
    problem: &str,
) -> Vec<Diagnostic> {
    mentions
        .iter()
        .filter(|m| m.step == 0 || m.step > step_count as u64)
        .map(|m| {
            let message = if step_count == 0 {
                format!(
                    "'step {}' is mentioned but problem {} has no operational steps",
                    m.step, problem
                )
            } else {
                format!(
                    "'step {}' does not exist; problem {} has {} operational step{}",
                    m.step,
                    problem,
                    step_count,
                    if step_count == 1 { "" } else { "s" }
                )
            };
            Diagnostic::warning(DiagnosticKind::Reference, m.line, m.span, message)
        })
        .collect()
}
