use crate::ast::{OcamlCode, TextAnswer};
use crate::source::{verbatim, SourceLine};

/// Free-text answer; the title comes from the open tag.
pub fn parse_text_answer(title: &str, lines: &[SourceLine<'_>]) -> TextAnswer {
    let answer = lines
        .iter()
        .map(|l| l.text())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();
    TextAnswer {
        title: title.to_string(),
        answer,
    }
}

/// Code is kept verbatim and never produces diagnostics. Verification is
/// recorded later.
pub fn parse_ocaml_code(lines: &[SourceLine<'_>]) -> OcamlCode {
    OcamlCode {
        code: verbatim(lines),
        verification: None,
    }
}
