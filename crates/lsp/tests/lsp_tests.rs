//! Tests for LSP diagnostics, completion, hover, and folding.
//!
//! These call the provider functions directly (not via LSP protocol), with
//! specs loaded from a temporary workspace.

use ics_lsp::workspace::Workspace;
use lsp_types::{CompletionItem, DiagnosticSeverity, NumberOrString, Position};
use tempfile::TempDir;

const SPEC: &str = r#"[
  { "Number": "1", "Blueprint": ["Complexity"], "Ocaml Code": null },
  { "Number": "2", "Proof": null }
]"#;

/// Helper: a workspace root whose `specs/` holds assignment 1.
fn workspace_with_spec() -> (TempDir, Workspace) {
    let dir = TempDir::new().expect("temp dir");
    let specs = dir.path().join("specs");
    std::fs::create_dir(&specs).expect("create specs dir");
    std::fs::write(specs.join("assignment1.json"), SPEC).expect("write spec");
    let workspace = Workspace::load(dir.path());
    (dir, workspace)
}

const HEADER: &str = "\
<<header
Name: Ada Lovelace
Assignment: Assignment 1
Collaborators: none
Date: 2026-10-01
Professor: Babbage
header>>
";

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

// ──────────────────────────────────────────────
// Diagnostics
// ──────────────────────────────────────────────

#[test]
fn clean_document_has_no_diagnostics() {
    let (_dir, workspace) = workspace_with_spec();
    let text = format!(
        "{HEADER}<<problem 1: Sorting\n<<blueprint\n<<complexity\nTime: O(n log n)\ncomplexity>>\nblueprint>>\nproblem>>\n"
    );
    let diags = ics_lsp::diagnostics::compute_diagnostics(&text, workspace.provider());
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
}

#[test]
fn every_problem_is_reported_with_zero_based_lines() {
    let (_dir, workspace) = workspace_with_spec();
    // Line 9 (1-based) opens a section the assignment spec withholds; line 11 is a
    // complexity block with no Time.
    let text = format!(
        "{HEADER}<<problem 1: Sorting\n<<operational-steps\noperational-steps>>\n<<blueprint\n<<complexity\ncomplexity>>\nblueprint>>\nproblem>>\n"
    );
    let diags = ics_lsp::diagnostics::compute_diagnostics(&text, workspace.provider());
    assert!(diags.len() >= 2, "lint should report more than the first error: {diags:?}");

    let violation = &diags[0];
    assert_eq!(violation.range.start.line, 8);
    assert_eq!(violation.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(violation.code, Some(NumberOrString::String("spec-violation".into())));
    assert_eq!(violation.source.as_deref(), Some("ics"));

    assert!(diags
        .iter()
        .any(|d| d.code == Some(NumberOrString::String("completeness".into())) && d.range.start.line == 11));
}

#[test]
fn missing_spec_is_reported_at_problem_open() {
    let dir = TempDir::new().expect("temp dir");
    let workspace = Workspace::load(dir.path());
    let text = format!("{HEADER}<<problem 1: Sorting\nproblem>>\n");
    let diags = ics_lsp::diagnostics::compute_diagnostics(&text, workspace.provider());
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, Some(NumberOrString::String("spec-unavailable".into())));
    assert_eq!(diags[0].range.start.line, 7);
}

#[test]
fn config_can_move_the_spec_directory() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("ics.toml"), "[specs]\ndir = \"course/specs\"\n").unwrap();
    let specs = dir.path().join("course/specs");
    std::fs::create_dir_all(&specs).unwrap();
    std::fs::write(specs.join("1.json"), SPEC).unwrap();
    let workspace = Workspace::load(dir.path());
    let text = format!("{HEADER}<<problem 2: Proof\nproblem>>\n");
    let diags = ics_lsp::diagnostics::compute_diagnostics(&text, workspace.provider());
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
}

#[test]
fn warnings_keep_warning_severity() {
    let (_dir, workspace) = workspace_with_spec();
    let text = format!(
        "{HEADER}<<problem 2: Proof\n<<proof: sum\n<<induction\nBaseCase: as in step 4\nInductiveHypothesis: holds for k\nInductiveStep: extend to k + 1\ninduction>>\nproof>>\nproblem>>\n"
    );
    let diags = ics_lsp::diagnostics::compute_diagnostics(&text, workspace.provider());
    let reference = diags
        .iter()
        .find(|d| d.code == Some(NumberOrString::String("reference".into())))
        .expect("reference warning");
    assert_eq!(reference.severity, Some(DiagnosticSeverity::WARNING));
    assert_eq!(reference.range.start.line, 10);
}

// ──────────────────────────────────────────────
// Completion
// ──────────────────────────────────────────────

#[test]
fn top_level_offers_header_and_problem() {
    let items = ics_lsp::completion::compute_completions(Position::new(0, 0), "");
    assert_eq!(labels(&items), vec!["<<header", "<<problem"]);
}

#[test]
fn inside_blueprint_offers_subsections_and_close() {
    let content = "<<problem 1: X\n<<blueprint\n\n";
    let items = ics_lsp::completion::compute_completions(Position::new(2, 0), content);
    let labels = labels(&items);
    assert!(labels.contains(&"<<functional-correctness"));
    assert!(labels.contains(&"<<input-output"));
    assert!(labels.contains(&"<<complexity"));
    assert!(labels.contains(&"blueprint>>"));
    assert!(!labels.contains(&"<<problem"));
    assert!(!labels.contains(&"problem>>"));
}

#[test]
fn leaf_section_offers_its_keys() {
    let content = "<<problem 1: X\n<<proof: p\n<<induction\n  Ba";
    let items = ics_lsp::completion::compute_completions(Position::new(3, 4), content);
    let labels = labels(&items);
    assert!(labels.contains(&"BaseCase:"));
    assert!(labels.contains(&"InductiveStep:"));
    assert!(labels.contains(&"induction>>"));

    // The edit replaces what was typed after the indentation.
    let base = items.iter().find(|i| i.label == "BaseCase:").unwrap();
    match base.text_edit.as_ref().unwrap() {
        lsp_types::CompletionTextEdit::Edit(edit) => {
            assert_eq!(edit.range.start, Position::new(3, 2));
            assert_eq!(edit.range.end, Position::new(3, 4));
            assert_eq!(edit.new_text, "BaseCase: ");
        }
        other => panic!("unexpected edit {other:?}"),
    }
}

#[test]
fn ocaml_code_only_offers_its_close_tag() {
    let content = "<<problem 1: X\n<<ocaml-code\nlet x = 1\n";
    let items = ics_lsp::completion::compute_completions(Position::new(3, 0), content);
    assert_eq!(labels(&items), vec!["ocaml-code>>"]);
}

// ──────────────────────────────────────────────
// Folding
// ──────────────────────────────────────────────

#[test]
fn folding_ranges_follow_matched_pairs() {
    let content = "<<problem 1: X\n<<blueprint\n<<complexity\nTime: O(1)\ncomplexity>>\nblueprint>>\nproblem>>\n<<header\n";
    let ranges = ics_lsp::folding::compute_folding_ranges(content);
    let spans: Vec<(u32, u32)> = ranges.iter().map(|r| (r.start_line, r.end_line)).collect();
    // The unclosed header is not folded.
    assert_eq!(spans, vec![(0, 6), (1, 5), (2, 4)]);
}

// ──────────────────────────────────────────────
// Hover
// ──────────────────────────────────────────────

#[test]
fn hover_on_close_tag_describes_section() {
    let content = "<<problem 1: X\nproblem>>";
    let hover = ics_lsp::hover::compute_hover(Position::new(1, 3), content).expect("hover");
    let lsp_types::HoverContents::Markup(markup) = hover.contents else {
        panic!("expected markup");
    };
    assert!(markup.value.contains("**problem**"));
    assert!(markup.value.contains("at top level"));
}
