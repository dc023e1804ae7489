//! Shared `Key: value` scanner for header-like sections.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Diagnostic, DiagnosticKind};
use crate::grammar::Tag;
use crate::source::SourceLine;

static KEY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z _-]*?)\s*:(.*)$").unwrap());

/// A recognised key, with alternative spellings.
pub(crate) struct Field {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl Field {
    pub const fn new(name: &'static str) -> Self {
        Field { name, aliases: &[] }
    }

    pub const fn with_aliases(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Field { name, aliases }
    }
}

/// What a `key:` line with an unrecognised key means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnknownKeys {
    /// Report it.
    Reject,
    /// Treat the line as a continuation of the current value.
    Continue,
}

pub(crate) struct FieldRules<'f> {
    pub tag: Tag,
    pub fields: &'f [Field],
    /// Each key requires its predecessor to have been accepted first.
    pub ordered: bool,
    pub unknown: UnknownKeys,
}

enum Current {
    None,
    Field(usize),
    /// Continuation lines of a rejected key or stray text are swallowed.
    Rejected,
}

/// Keys compare case-insensitively, ignoring spaces, `-` and `_`.
fn normalize(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FieldRules<'_> {
    fn lookup(&self, key: &str) -> Option<usize> {
        let key = normalize(key);
        self.fields.iter().position(|f| {
            normalize(f.name) == key || f.aliases.iter().any(|a| normalize(a) == key)
        })
    }

    /// Scan `lines`, returning one value per field (`None` when the key never
    /// appeared or was rejected).
    pub fn scan(&self, lines: &[SourceLine<'_>], diags: &mut Vec<Diagnostic>) -> Vec<Option<String>> {
        let mut values: Vec<Option<String>> = vec![None; self.fields.len()];
        let mut current = Current::None;

        for line in lines {
            if line.is_blank() {
                continue;
            }
            let text = line.text();

            if let Some(caps) = KEY_LINE.captures(text) {
                let key = &caps[1];
                let key_span = line.span_of(0..key.len());
                match self.lookup(key) {
                    Some(i) => {
                        let field = &self.fields[i];
                        if values[i].is_some() {
                            diags.push(
                                Diagnostic::error(
                                    DiagnosticKind::DuplicateKey,
                                    line.number,
                                    key_span,
                                    format!("'{}' appears more than once", field.name),
                                )
                                .with_tag(self.tag.name()),
                            );
                            current = Current::Rejected;
                            continue;
                        }
                        if self.ordered && i > 0 && values[i - 1].is_none() {
                            let order: Vec<_> = self.fields.iter().map(|f| f.name).collect();
                            diags.push(
                                Diagnostic::error(
                                    DiagnosticKind::Order,
                                    line.number,
                                    key_span,
                                    format!(
                                        "'{}' must come after '{}' (expected order: {})",
                                        field.name,
                                        self.fields[i - 1].name,
                                        order.join(", ")
                                    ),
                                )
                                .with_tag(self.tag.name()),
                            );
                            current = Current::Rejected;
                            continue;
                        }
                        values[i] = Some(caps[2].trim().to_string());
                        current = Current::Field(i);
                        continue;
                    }
                    None if self.unknown == UnknownKeys::Reject => {
                        let known: Vec<_> = self.fields.iter().map(|f| f.name).collect();
                        diags.push(
                            Diagnostic::error(
                                DiagnosticKind::UnknownKey,
                                line.number,
                                key_span,
                                format!(
                                    "unknown key '{}' in '{}' (expected one of: {})",
                                    key,
                                    self.tag,
                                    known.join(", ")
                                ),
                            )
                            .with_tag(self.tag.name()),
                        );
                        current = Current::Rejected;
                        continue;
                    }
                    None => {}
                }
            }

            match current {
                Current::Field(i) => {
                    if let Some(value) = values[i].as_mut() {
                        if !value.is_empty() {
                            value.push('\n');
                        }
                        value.push_str(text);
                    }
                }
                Current::Rejected => {}
                Current::None => {
                    diags.push(
                        Diagnostic::error(
                            DiagnosticKind::StrayContent,
                            line.number,
                            line.full_span(),
                            format!("text outside of any field in '{}'; expected 'Key: value'", self.tag),
                        )
                        .with_tag(self.tag.name()),
                    );
                    current = Current::Rejected;
                }
            }
        }
        values
    }
}
