//! Validates the assignment spec fixtures against
//! schema/assignment-spec.schema.json and checks that the loader accepts
//! every file the schema accepts.

use ics_core::AssignmentSpec;
use std::path::Path;

fn load_validator() -> jsonschema::Validator {
    let schema_path =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schema/assignment-spec.schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

#[test]
fn spec_fixtures_match_schema_and_load() {
    let validator = load_validator();
    let specs_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../conformance/specs");

    let mut paths: Vec<_> = std::fs::read_dir(&specs_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "no spec fixtures in {}", specs_dir.display());

    let mut failures = Vec::new();
    for path in &paths {
        let src = std::fs::read_to_string(path).unwrap();
        let instance: serde_json::Value = serde_json::from_str(&src).unwrap();
        if let Err(error) = validator.validate(&instance) {
            failures.push(format!("{}: {}", path.display(), error));
            continue;
        }
        if let Err(error) = AssignmentSpec::from_json_value("fixture", &instance) {
            failures.push(format!("{}: schema-valid but rejected by loader: {}", path.display(), error));
        }
    }

    assert!(
        failures.is_empty(),
        "{} of {} spec fixtures failed:\n{}",
        failures.len(),
        paths.len(),
        failures.join("\n")
    );
}

#[test]
fn schema_rejects_unknown_blueprint_parts() {
    let validator = load_validator();
    let instance = serde_json::json!([{ "Number": "1", "Blueprint": ["Termination"] }]);
    assert!(validator.validate(&instance).is_err());

    let instance = serde_json::json!([{ "Proof": null }]);
    assert!(validator.validate(&instance).is_err());
}
