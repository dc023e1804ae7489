//! Lint-to-diagnostic conversion.
//!
//! Runs `ics_core::lint` over the editor's buffer and converts every
//! finding into an `lsp_types::Diagnostic`. Unlike `compile`, lint never
//! stops at the first error, so the editor sees everything at once.

use ics_core::assignment::AssignmentSpecProvider;
use ics_core::{CompileOptions, Severity};
use lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};

pub const SOURCE: &str = "ics";

/// Lint `content` and return editor diagnostics.
pub fn compute_diagnostics(content: &str, provider: &dyn AssignmentSpecProvider) -> Vec<Diagnostic> {
    let lines: Vec<&str> = content.lines().collect();
    ics_core::lint(content, provider, &CompileOptions::default())
        .iter()
        .map(|diag| {
            let text = lines
                .get(diag.line.saturating_sub(1) as usize)
                .copied()
                .unwrap_or("");
            to_lsp(diag, text)
        })
        .collect()
}

/// Convert one core diagnostic reported on `line_text`. Core lines are
/// 1-based; LSP lines are 0-based. Core columns count characters; LSP
/// columns count UTF-16 code units.
pub fn to_lsp(diag: &ics_core::Diagnostic, line_text: &str) -> Diagnostic {
    let line = diag.line.saturating_sub(1);
    let (start, end) = if diag.span.end > diag.span.start {
        (
            utf16_column(line_text, diag.span.start),
            utf16_column(line_text, diag.span.end),
        )
    } else {
        (0, u32::MAX)
    };
    let mut message = diag.message.clone();
    if let Some(tag) = &diag.tag {
        message = format!("{}: {}", tag, message);
    }
    Diagnostic {
        range: Range::new(Position::new(line, start), Position::new(line, end)),
        severity: Some(match diag.severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
        }),
        code: Some(NumberOrString::String(diag.kind.code().to_string())),
        source: Some(SOURCE.to_string()),
        message,
        ..Default::default()
    }
}

/// UTF-16 offset of character column `col`. Columns past the end of the
/// line count one unit each.
fn utf16_column(line: &str, col: u32) -> u32 {
    let (chars, units) = line
        .chars()
        .take(col as usize)
        .fold((0u32, 0u32), |(n, units), c| (n + 1, units + c.len_utf16() as u32));
    units + (col - chars)
}
