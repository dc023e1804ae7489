use regex::Regex;
use std::sync::LazyLock;

use crate::ast::OperationalSteps;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::grammar::Tag;
use crate::source::SourceLine;

/// `step:`, `Step 3:`, `STEP 12 :`. Any digits are cosmetic; steps are
/// numbered by position.
pub(crate) static STEP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^step\s*\d*\s*:\s*(.*)$").unwrap());

pub fn parse_operational_steps(
    lines: &[SourceLine<'_>],
    diags: &mut Vec<Diagnostic>,
) -> OperationalSteps {
    let mut steps: Vec<String> = Vec::new();
    let mut stray_reported = false;

    for line in lines {
        if line.is_blank() {
            continue;
        }
        let text = line.text();
        if let Some(caps) = STEP_MARKER.captures(text) {
            steps.push(caps[1].trim().to_string());
            continue;
        }
        match steps.last_mut() {
            Some(step) => {
                if !step.is_empty() {
                    step.push('\n');
                }
                step.push_str(text);
            }
            None if !stray_reported => {
                diags.push(
                    Diagnostic::error(
                        DiagnosticKind::StrayContent,
                        line.number,
                        line.full_span(),
                        "text before the first 'step:' marker",
                    )
                    .with_tag(Tag::OperationalSteps.name()),
                );
                stray_reported = true;
            }
            None => {}
        }
    }
    OperationalSteps { steps }
}
