//! Typed document tree produced by the builder.
//!
//! Every node answers `is_complete()` from its own fields alone (plus, for
//! the blueprint, the set of parts the assignment spec required when it was
//! admitted). `missing()` names what is absent, for completeness messages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::grammar::Tag;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub header: Header,
    pub problems: Vec<Problem>,
}

impl Document {
    pub fn problem(&self, number: &str) -> Option<&Problem> {
        self.problems.iter().find(|p| p.number == number)
    }

    pub fn is_complete(&self) -> bool {
        self.header.is_complete() && self.problems.iter().all(Problem::is_complete)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Header {
    pub name: String,
    pub assignment: String,
    pub collaborators: String,
    pub date: String,
    pub professor: String,
    /// Digits taken from `assignment`, e.g. "1" for "Assignment 1".
    pub assignment_number: Option<String>,
}

impl Header {
    /// First run of digits in the assignment field, without leading zeros.
    pub fn derive_assignment_number(assignment: &str) -> Option<String> {
        let start = assignment.find(|c: char| c.is_ascii_digit())?;
        let digits: String = assignment[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse::<u64>().ok().map(|n| n.to_string())
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (value, name) in [
            (&self.name, "Name"),
            (&self.assignment, "Assignment"),
            (&self.collaborators, "Collaborators"),
            (&self.date, "Date"),
            (&self.professor, "Professor"),
        ] {
            if value.is_empty() {
                missing.push(name);
            }
        }
        if !self.assignment.is_empty() && self.assignment_number.is_none() {
            missing.push("assignment number");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Top-level section kinds a problem may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SectionKind {
    Blueprint,
    OperationalSteps,
    OcamlCode,
    Proof,
    TextAnswer,
}

impl SectionKind {
    pub fn from_tag(tag: Tag) -> Option<SectionKind> {
        match tag {
            Tag::Blueprint => Some(SectionKind::Blueprint),
            Tag::OperationalSteps => Some(SectionKind::OperationalSteps),
            Tag::OcamlCode => Some(SectionKind::OcamlCode),
            Tag::Proof => Some(SectionKind::Proof),
            Tag::TextAnswer => Some(SectionKind::TextAnswer),
            _ => None,
        }
    }
}

/// Blueprint subsections an assignment spec can permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlueprintPart {
    FunctionalCorrectness,
    InputOutput,
    Complexity,
}

impl BlueprintPart {
    /// Parse the names used in assignment spec files
    /// (`FunctionalCorrectness`, `Input-Output`, `Complexity`).
    pub fn from_spec_name(name: &str) -> Option<BlueprintPart> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "functionalcorrectness" => Some(BlueprintPart::FunctionalCorrectness),
            "inputoutput" => Some(BlueprintPart::InputOutput),
            "complexity" => Some(BlueprintPart::Complexity),
            _ => None,
        }
    }

    pub fn spec_name(self) -> &'static str {
        match self {
            BlueprintPart::FunctionalCorrectness => "FunctionalCorrectness",
            BlueprintPart::InputOutput => "Input-Output",
            BlueprintPart::Complexity => "Complexity",
        }
    }

    pub fn tag(self) -> Tag {
        match self {
            BlueprintPart::FunctionalCorrectness => Tag::FunctionalCorrectness,
            BlueprintPart::InputOutput => Tag::InputOutput,
            BlueprintPart::Complexity => Tag::Complexity,
        }
    }

    pub fn from_tag(tag: Tag) -> Option<BlueprintPart> {
        match tag {
            Tag::FunctionalCorrectness => Some(BlueprintPart::FunctionalCorrectness),
            Tag::InputOutput => Some(BlueprintPart::InputOutput),
            Tag::Complexity => Some(BlueprintPart::Complexity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub number: String,
    pub title: String,
    pub blueprint: Option<Blueprint>,
    pub operational_steps: Option<OperationalSteps>,
    pub ocaml_code: Option<OcamlCode>,
    pub proofs: Vec<Proof>,
    pub text_answers: Vec<TextAnswer>,
}

impl Problem {
    pub fn is_complete(&self) -> bool {
        self.blueprint.as_ref().map_or(true, Blueprint::is_complete)
            && self
                .operational_steps
                .as_ref()
                .map_or(true, OperationalSteps::is_complete)
            && self.ocaml_code.as_ref().map_or(true, OcamlCode::is_complete)
            && self.proofs.iter().all(Proof::is_complete)
            && self.text_answers.iter().all(TextAnswer::is_complete)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Blueprint {
    pub functional_correctness: Option<FunctionalCorrectness>,
    pub input_output: Option<InputOutput>,
    pub complexity: Option<Complexity>,
    /// Parts the assignment spec required when this blueprint was admitted.
    pub required: BTreeSet<BlueprintPart>,
}

impl Blueprint {
    fn part_complete(&self, part: BlueprintPart) -> Option<bool> {
        match part {
            BlueprintPart::FunctionalCorrectness => self
                .functional_correctness
                .as_ref()
                .map(FunctionalCorrectness::is_complete),
            BlueprintPart::InputOutput => self.input_output.as_ref().map(InputOutput::is_complete),
            BlueprintPart::Complexity => self.complexity.as_ref().map(Complexity::is_complete),
        }
    }

    /// Required parts that are absent.
    pub fn missing(&self) -> Vec<BlueprintPart> {
        self.required
            .iter()
            .copied()
            .filter(|p| self.part_complete(*p).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.required
            .iter()
            .all(|p| self.part_complete(*p) == Some(true))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionalCorrectness {
    pub requires: String,
    pub ensures: String,
}

impl FunctionalCorrectness {
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.requires.is_empty() {
            missing.push("Requires");
        }
        if self.ensures.is_empty() {
            missing.push("Ensures");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputOutput {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    /// Set when Input/Output entries did not strictly alternate.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub alternation_broken: bool,
}

impl InputOutput {
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.inputs.is_empty() {
            missing.push("Input");
        }
        if self.outputs.is_empty() {
            missing.push("Output");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        !self.alternation_broken
            && self.missing().is_empty()
            && self.inputs.len() == self.outputs.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Complexity {
    pub time: String,
    pub space: Option<String>,
}

impl Complexity {
    pub fn missing(&self) -> Vec<&'static str> {
        if self.time.is_empty() {
            vec!["Time"]
        } else {
            Vec::new()
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.time.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationalSteps {
    /// Step texts in order of occurrence; step N is `steps[N - 1]`.
    pub steps: Vec<String>,
}

impl OperationalSteps {
    pub fn is_complete(&self) -> bool {
        !self.steps.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Verified,
    Failed,
}

/// Verdict recorded from the external code verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub status: VerificationStatus,
    pub raw_output: String,
}

impl Verification {
    pub fn verified(raw_output: impl Into<String>) -> Self {
        Verification {
            status: VerificationStatus::Verified,
            raw_output: raw_output.into(),
        }
    }

    pub fn failed(raw_output: impl Into<String>) -> Self {
        Verification {
            status: VerificationStatus::Failed,
            raw_output: raw_output.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OcamlCode {
    pub code: String,
    /// Unset until a verifier has run over the document.
    pub verification: Option<Verification>,
}

impl OcamlCode {
    pub fn is_complete(&self) -> bool {
        !self.code.trim().is_empty()
    }

    pub fn status(&self) -> Option<VerificationStatus> {
        self.verification.as_ref().map(|v| v.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Induction {
    pub base_case: String,
    pub inductive_hypothesis: String,
    pub inductive_step: String,
}

impl Induction {
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (&self.base_case, "BaseCase"),
            (&self.inductive_hypothesis, "InductiveHypothesis"),
            (&self.inductive_step, "InductiveStep"),
        ]
        .into_iter()
        .filter(|(v, _)| v.is_empty())
        .map(|(_, name)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Invariant {
    pub initialisation: String,
    pub maintenance: String,
    pub termination: String,
}

impl Invariant {
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (&self.initialisation, "Initialisation"),
            (&self.maintenance, "Maintenance"),
            (&self.termination, "Termination"),
        ]
        .into_iter()
        .filter(|(v, _)| v.is_empty())
        .map(|(_, name)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProofVariant {
    Induction(Induction),
    Invariant(Invariant),
}

impl ProofVariant {
    pub fn is_complete(&self) -> bool {
        match self {
            ProofVariant::Induction(i) => i.is_complete(),
            ProofVariant::Invariant(i) => i.is_complete(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Proof {
    pub helper: bool,
    pub title: String,
    pub variant: Option<ProofVariant>,
}

impl Proof {
    pub fn is_complete(&self) -> bool {
        self.variant.as_ref().is_some_and(ProofVariant::is_complete)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextAnswer {
    pub title: String,
    pub answer: String,
}

impl TextAnswer {
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.answer.is_empty()
    }
}
