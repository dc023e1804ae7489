//! Blueprint subsections: functional correctness, worked examples and cost.

use regex::Regex;
use std::sync::LazyLock;

use crate::ast::{Complexity, FunctionalCorrectness, InputOutput};
use crate::error::{Diagnostic, DiagnosticKind};
use crate::grammar::Tag;
use crate::source::SourceLine;

use super::fields::{Field, FieldRules, UnknownKeys};

/// First whole-word `input` or `output` on a line, with the content after it.
static IO_TOGGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(input|output)\b\s*:?\s*(.*)$").unwrap());

const FC_FIELDS: &[Field] = &[Field::new("Requires"), Field::new("Ensures")];

const COMPLEXITY_FIELDS: &[Field] = &[Field::new("Time"), Field::new("Space")];

/// Requires/Ensures pair. Values may contain colons, so lines with other
/// keys continue the current value.
pub fn parse_functional_correctness(
    lines: &[SourceLine<'_>],
    diags: &mut Vec<Diagnostic>,
) -> FunctionalCorrectness {
    let rules = FieldRules {
        tag: Tag::FunctionalCorrectness,
        fields: FC_FIELDS,
        ordered: false,
        unknown: UnknownKeys::Continue,
    };
    let mut values = rules.scan(lines, diags);
    FunctionalCorrectness {
        requires: values[0].take().unwrap_or_default(),
        ensures: values[1].take().unwrap_or_default(),
    }
}

pub fn parse_complexity(lines: &[SourceLine<'_>], diags: &mut Vec<Diagnostic>) -> Complexity {
    let rules = FieldRules {
        tag: Tag::Complexity,
        fields: COMPLEXITY_FIELDS,
        ordered: false,
        unknown: UnknownKeys::Reject,
    };
    let mut values = rules.scan(lines, diags);
    Complexity {
        time: values[0].take().unwrap_or_default(),
        space: values[1].take().filter(|s| !s.is_empty()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Input,
    Output,
}

/// Alternating Input/Output entries. Any line containing the word `input`
/// or `output` switches sides; when both appear, the earlier one wins. Text
/// after the word is the start of the entry. `close` is the
/// `input-output>>` line, where a dangling Input is reported.
pub fn parse_input_output(
    lines: &[SourceLine<'_>],
    close: &SourceLine<'_>,
    diags: &mut Vec<Diagnostic>,
) -> InputOutput {
    let mut io = InputOutput::default();
    let mut last: Option<(Side, u32)> = None;
    let mut stray_reported = false;

    for line in lines {
        if line.is_blank() {
            continue;
        }
        let text = line.text();

        let Some(caps) = IO_TOGGLE.captures(text) else {
            let entry = match last {
                Some((Side::Input, _)) => io.inputs.last_mut(),
                Some((Side::Output, _)) => io.outputs.last_mut(),
                None => None,
            };
            match entry {
                Some(entry) => {
                    if !entry.is_empty() {
                        entry.push('\n');
                    }
                    entry.push_str(text);
                }
                None if !stray_reported => {
                    diags.push(
                        Diagnostic::error(
                            DiagnosticKind::StrayContent,
                            line.number,
                            line.full_span(),
                            "text before the first Input in 'input-output'",
                        )
                        .with_tag(Tag::InputOutput.name()),
                    );
                    stray_reported = true;
                }
                None => {}
            }
            continue;
        };

        let keyword_match = caps.get(1).map_or(0..0, |m| m.range());
        let keyword = &text[keyword_match.clone()];
        let side = if keyword.eq_ignore_ascii_case("input") {
            Side::Input
        } else {
            Side::Output
        };
        let problem = match (side, last) {
            (Side::Output, None) => Some("Output without a preceding Input".to_string()),
            (Side::Input, Some((Side::Input, prev))) => Some(format!(
                "Input follows the Input on line {} without an Output",
                prev
            )),
            (Side::Output, Some((Side::Output, prev))) => Some(format!(
                "Output follows the Output on line {} without an Input",
                prev
            )),
            _ => None,
        };
        if let Some(message) = problem {
            io.alternation_broken = true;
            diags.push(
                Diagnostic::error(
                    DiagnosticKind::Alternation,
                    line.number,
                    line.span_of(keyword_match),
                    message,
                )
                .with_tag(Tag::InputOutput.name()),
            );
        }

        let inline = caps[2].trim().to_string();
        match side {
            Side::Input => io.inputs.push(inline),
            Side::Output => io.outputs.push(inline),
        }
        last = Some((side, line.number));
    }

    if let Some((Side::Input, prev)) = last {
        io.alternation_broken = true;
        diags.push(
            Diagnostic::error(
                DiagnosticKind::Alternation,
                close.number,
                close.full_span(),
                format!("the Input on line {} has no matching Output", prev),
            )
            .with_tag(Tag::InputOutput.name()),
        );
    }
    io
}
