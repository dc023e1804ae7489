//! Conformance suite over the documents in `conformance/`.
//!
//! - `positive/<name>.ics` must compile to a complete document with no
//!   diagnostics at all.
//! - `negative/<name>.ics` must be rejected; `<name>.expected-error.json`
//!   gives the expected `kind` and `line`. Lint must report the same error
//!   first.
//!
//! Specs are read from `conformance/specs/` like the CLI would.

use ics_core::{compile, lint, CompileError, CompileOptions, DirectorySpecProvider};
use std::path::{Path, PathBuf};

fn conformance_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../conformance")
}

fn provider() -> DirectorySpecProvider {
    DirectorySpecProvider::new(conformance_root().join("specs"))
}

fn documents(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", dir.display(), e))
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "ics"))
        .collect();
    paths.sort();
    paths
}

#[test]
fn positive_documents_compile_cleanly() {
    let provider = provider();
    let paths = documents(&conformance_root().join("positive"));
    assert!(!paths.is_empty(), "no positive fixtures found");

    for path in paths {
        let text = std::fs::read_to_string(&path).unwrap();
        let document = compile(&text, &provider, &CompileOptions::default())
            .unwrap_or_else(|e| panic!("{} should compile: {}", path.display(), e));
        assert!(document.is_complete(), "{} is incomplete", path.display());

        let diagnostics = lint(&text, &provider, &CompileOptions::default());
        assert!(
            diagnostics.is_empty(),
            "{} has diagnostics:\n{}",
            path.display(),
            diagnostics
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

#[test]
fn negative_documents_fail_with_expected_error() {
    let provider = provider();
    let paths = documents(&conformance_root().join("negative"));
    assert!(!paths.is_empty(), "no negative fixtures found");

    for path in paths {
        let name = path.file_stem().unwrap().to_string_lossy().to_string();
        let expected_path = path.with_file_name(format!("{}.expected-error.json", name));
        let expected: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(&expected_path)
                .unwrap_or_else(|e| panic!("Failed to read {}: {}", expected_path.display(), e)),
        )
        .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let diagnostic = match compile(&text, &provider, &CompileOptions::default()) {
            Err(CompileError::Rejected { diagnostic, .. }) => diagnostic,
            other => panic!("{} should be rejected, got {:?}", name, other),
        };
        let actual = diagnostic.to_json_value();
        assert_eq!(actual["kind"], expected["kind"], "kind mismatch for {}: {}", name, diagnostic);
        assert_eq!(actual["line"], expected["line"], "line mismatch for {}: {}", name, diagnostic);

        let first_lint_error = lint(&text, &provider, &CompileOptions::default())
            .into_iter()
            .find(|d| d.is_error());
        assert_eq!(first_lint_error.as_ref(), Some(&diagnostic), "lint disagrees for {}", name);
    }
}
