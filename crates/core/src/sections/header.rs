use crate::ast::Header;
use crate::error::Diagnostic;
use crate::grammar::Tag;
use crate::source::SourceLine;

use super::fields::{Field, FieldRules, UnknownKeys};

const HEADER_FIELDS: &[Field] = &[
    Field::new("Name"),
    Field::new("Assignment"),
    Field::new("Collaborators"),
    Field::new("Date"),
    Field::new("Professor"),
];

/// Parse the `<<header` body. The assignment number is derived from the
/// `Assignment` value.
pub fn parse_header(lines: &[SourceLine<'_>], diags: &mut Vec<Diagnostic>) -> Header {
    let rules = FieldRules {
        tag: Tag::Header,
        fields: HEADER_FIELDS,
        ordered: false,
        unknown: UnknownKeys::Reject,
    };
    let values = rules.scan(lines, diags);
    let field = |i: usize| values[i].clone().unwrap_or_default();
    let assignment = field(1);
    Header {
        name: field(0),
        assignment_number: Header::derive_assignment_number(&assignment),
        assignment,
        collaborators: field(2),
        date: field(3),
        professor: field(4),
    }
}
