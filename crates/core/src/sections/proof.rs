use crate::ast::{Induction, Invariant};
use crate::error::Diagnostic;
use crate::grammar::Tag;
use crate::source::SourceLine;

use super::fields::{Field, FieldRules, UnknownKeys};

const INDUCTION_FIELDS: &[Field] = &[
    Field::with_aliases("BaseCase", &["Base"]),
    Field::with_aliases("InductiveHypothesis", &["Hypothesis", "IH"]),
    Field::with_aliases("InductiveStep", &["Step"]),
];

const INVARIANT_FIELDS: &[Field] = &[
    Field::with_aliases("Initialisation", &["Initialization"]),
    Field::new("Maintenance"),
    Field::new("Termination"),
];

/// BaseCase, InductiveHypothesis, InductiveStep, strictly in that order.
pub fn parse_induction(lines: &[SourceLine<'_>], diags: &mut Vec<Diagnostic>) -> Induction {
    let rules = FieldRules {
        tag: Tag::Induction,
        fields: INDUCTION_FIELDS,
        ordered: true,
        unknown: UnknownKeys::Reject,
    };
    let mut values = rules.scan(lines, diags);
    Induction {
        base_case: values[0].take().unwrap_or_default(),
        inductive_hypothesis: values[1].take().unwrap_or_default(),
        inductive_step: values[2].take().unwrap_or_default(),
    }
}

/// Initialisation, Maintenance, Termination, strictly in that order.
pub fn parse_invariant(lines: &[SourceLine<'_>], diags: &mut Vec<Diagnostic>) -> Invariant {
    let rules = FieldRules {
        tag: Tag::Invariant,
        fields: INVARIANT_FIELDS,
        ordered: true,
        unknown: UnknownKeys::Reject,
    };
    let mut values = rules.scan(lines, diags);
    Invariant {
        initialisation: values[0].take().unwrap_or_default(),
        maintenance: values[1].take().unwrap_or_default(),
        termination: values[2].take().unwrap_or_default(),
    }
}
