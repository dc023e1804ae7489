//! Per-assignment capability table and the gate the builder consults before
//! admitting a section.
//!
//! Specs arrive as JSON arrays of problem entries:
//!
//! ```json
//! [{ "Number": "1", "Blueprint": ["FunctionalCorrectness"], "Operational Steps": null }]
//! ```
//!
//! The presence of a key permits that section. `Blueprint` lists the
//! permitted blueprint parts.

mod provider;

pub use provider::{
    AssignmentSpecProvider, CachedSpecProvider, DirectorySpecProvider, InMemorySpecProvider,
};

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::ast::{BlueprintPart, SectionKind};
use crate::error::SpecLoadError;

/// What one problem may contain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProblemSpec {
    /// `None`: no blueprint allowed. `Some(parts)`: blueprint allowed with
    /// exactly these subsections.
    pub blueprint: Option<BTreeSet<BlueprintPart>>,
    pub operational_steps: bool,
    pub ocaml_code: bool,
    pub proof: bool,
    pub text_answer: bool,
}

impl ProblemSpec {
    pub fn allows(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Blueprint => self.blueprint.is_some(),
            SectionKind::OperationalSteps => self.operational_steps,
            SectionKind::OcamlCode => self.ocaml_code,
            SectionKind::Proof => self.proof,
            SectionKind::TextAnswer => self.text_answer,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentSpec {
    pub assignment: String,
    pub problems: BTreeMap<String, ProblemSpec>,
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl AssignmentSpec {
    pub fn new(assignment: impl Into<String>) -> Self {
        AssignmentSpec {
            assignment: assignment.into(),
            problems: BTreeMap::new(),
        }
    }

    pub fn with_problem(mut self, number: impl Into<String>, spec: ProblemSpec) -> Self {
        self.problems.insert(number.into(), spec);
        self
    }

    pub fn problem(&self, number: &str) -> Option<&ProblemSpec> {
        self.problems.get(number)
    }

    pub fn from_json_str(assignment: &str, json: &str) -> Result<Self, SpecLoadError> {
        let value: Value = serde_json::from_str(json).map_err(|e| SpecLoadError::Malformed {
            assignment: assignment.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_value(assignment, &value)
    }

    pub fn from_json_value(assignment: &str, value: &Value) -> Result<Self, SpecLoadError> {
        let malformed = |message: String| SpecLoadError::Malformed {
            assignment: assignment.to_string(),
            message,
        };

        let entries = value
            .as_array()
            .ok_or_else(|| malformed("expected an array of problem entries".to_string()))?;

        let mut spec = AssignmentSpec::new(assignment);
        for (i, entry) in entries.iter().enumerate() {
            let obj = entry
                .as_object()
                .ok_or_else(|| malformed(format!("entry {} is not an object", i)))?;

            let mut number = None;
            let mut problem = ProblemSpec::default();
            for (key, value) in obj {
                // A key's presence grants the section; only an explicit false withholds it.
                let granted = value.as_bool() != Some(false);
                match normalize_key(key).as_str() {
                    "number" => {
                        number = match value {
                            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                            Value::Number(n) => Some(n.to_string()),
                            _ => {
                                return Err(malformed(format!(
                                    "entry {} has an invalid Number: {}",
                                    i, value
                                )))
                            }
                        }
                    }
                    "blueprint" => problem.blueprint = parse_blueprint(value).map_err(&malformed)?,
                    "operationalsteps" => problem.operational_steps = granted,
                    "ocamlcode" => problem.ocaml_code = granted,
                    "proof" => problem.proof = granted,
                    "textanswer" => problem.text_answer = granted,
                    _ => tracing::debug!(assignment, key = key.as_str(), "ignoring unknown spec key"),
                }
            }

            let number = number.ok_or_else(|| malformed(format!("entry {} has no Number", i)))?;
            if spec.problems.contains_key(&number) {
                return Err(malformed(format!("problem {} is listed twice", number)));
            }
            spec.problems.insert(number, problem);
        }
        Ok(spec)
    }
}

fn parse_blueprint(value: &Value) -> Result<Option<BTreeSet<BlueprintPart>>, String> {
    match value {
        Value::Null | Value::Bool(true) => Ok(Some(BTreeSet::new())),
        Value::Bool(false) => Ok(None),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let name = item
                    .as_str()
                    .ok_or_else(|| format!("blueprint part {} is not a string", item))?;
                BlueprintPart::from_spec_name(name)
                    .ok_or_else(|| format!("unknown blueprint part '{}'", name))
            })
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Some),
        other => Err(format!("Blueprint must be an array or null, got {}", other)),
    }
}

/// Why the gate could not answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// No spec is loaded; the reason says why.
    #[error("assignment spec unavailable: {0}")]
    Unavailable(String),
    #[error("problem {problem} is not part of assignment {assignment}")]
    UnknownProblem { problem: String, assignment: String },
}

/// Answers permission queries for one document.
#[derive(Debug, Clone)]
pub struct SpecGate {
    spec: Result<Arc<AssignmentSpec>, String>,
}

impl Default for SpecGate {
    fn default() -> Self {
        SpecGate::unavailable("no header has been read")
    }
}

impl SpecGate {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        SpecGate {
            spec: Err(reason.into()),
        }
    }

    pub fn loaded(spec: Arc<AssignmentSpec>) -> Self {
        SpecGate { spec: Ok(spec) }
    }

    pub fn spec(&self) -> Option<&AssignmentSpec> {
        self.spec.as_deref().ok()
    }

    pub fn check_problem(&self, number: &str) -> Result<&ProblemSpec, GateError> {
        let spec = self
            .spec
            .as_deref()
            .map_err(|reason| GateError::Unavailable(reason.clone()))?;
        spec.problem(number).ok_or_else(|| GateError::UnknownProblem {
            problem: number.to_string(),
            assignment: spec.assignment.clone(),
        })
    }

    pub fn is_section_allowed(&self, number: &str, kind: SectionKind) -> Result<bool, GateError> {
        Ok(self.check_problem(number)?.allows(kind))
    }

    /// Parts a blueprint in this problem may contain; empty when the
    /// blueprint itself is not allowed.
    pub fn allowed_blueprint_subsections(
        &self,
        number: &str,
    ) -> Result<BTreeSet<BlueprintPart>, GateError> {
        Ok(self
            .check_problem(number)?
            .blueprint
            .clone()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"[
        { "Number": "1", "Blueprint": ["FunctionalCorrectness", "Input-Output"], "Operational Steps": null, "Ocaml Code": null },
        { "Number": 2, "Proof": null, "Text Answer": null },
        { "Number": "3", "Blueprint": null }
    ]"#;

    #[test]
    fn parses_key_presence_as_permission() {
        let spec = AssignmentSpec::from_json_str("1", SPEC).unwrap();
        assert_eq!(spec.problems.len(), 3);

        let p1 = spec.problem("1").unwrap();
        assert!(p1.allows(SectionKind::Blueprint));
        assert!(p1.allows(SectionKind::OperationalSteps));
        assert!(p1.allows(SectionKind::OcamlCode));
        assert!(!p1.allows(SectionKind::Proof));
        assert_eq!(
            p1.blueprint.as_ref().unwrap().iter().copied().collect::<Vec<_>>(),
            vec![BlueprintPart::FunctionalCorrectness, BlueprintPart::InputOutput]
        );

        let p2 = spec.problem("2").unwrap();
        assert!(p2.allows(SectionKind::Proof));
        assert!(!p2.allows(SectionKind::Blueprint));

        let p3 = spec.problem("3").unwrap();
        assert_eq!(p3.blueprint, Some(BTreeSet::new()));
    }

    #[test]
    fn unknown_blueprint_part_is_malformed() {
        let err = AssignmentSpec::from_json_str("1", r#"[{"Number": "1", "Blueprint": ["Termination"]}]"#)
            .unwrap_err();
        assert!(err.to_string().contains("Termination"));
    }

    #[test]
    fn missing_number_and_duplicates_are_malformed() {
        assert!(AssignmentSpec::from_json_str("1", r#"[{"Proof": null}]"#).is_err());
        assert!(
            AssignmentSpec::from_json_str("1", r#"[{"Number": "1"}, {"Number": 1}]"#).is_err()
        );
        assert!(AssignmentSpec::from_json_str("1", r#"{"Number": "1"}"#).is_err());
    }

    #[test]
    fn gate_answers_per_problem() {
        let spec = AssignmentSpec::from_json_str("1", SPEC).unwrap();
        let gate = SpecGate::loaded(Arc::new(spec));
        assert_eq!(gate.is_section_allowed("1", SectionKind::OcamlCode), Ok(true));
        assert_eq!(gate.is_section_allowed("2", SectionKind::OcamlCode), Ok(false));
        assert!(gate.allowed_blueprint_subsections("2").unwrap().is_empty());
        assert!(matches!(
            gate.is_section_allowed("9", SectionKind::Proof),
            Err(GateError::UnknownProblem { .. })
        ));
    }

    #[test]
    fn unloaded_gate_is_unavailable() {
        let gate = SpecGate::unavailable("header is missing Assignment");
        let err = gate.is_section_allowed("1", SectionKind::Proof).unwrap_err();
        assert!(matches!(err, GateError::Unavailable(_)));
        assert!(err.to_string().contains("missing Assignment"));
    }
}
