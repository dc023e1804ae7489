//! End-to-end properties of `compile` and `lint` over small documents.

use ics_core::ast::{ProofVariant, VerificationStatus};
use ics_core::{
    compile, lint, AssignmentSpec, CompileError, CompileOptions, DiagnosticKind,
    InMemorySpecProvider,
};

const HEADER: &str = "\
<<header
Name: Ada Lovelace
Assignment: Assignment 1
Collaborators: none
Date: 2024-09-30
Professor: C. Babbage
header>>
";

const SPEC: &str = r#"[
    { "Number": "1", "Blueprint": ["FunctionalCorrectness", "Input-Output", "Complexity"],
      "Operational Steps": null, "Ocaml Code": null },
    { "Number": "2", "Blueprint": ["FunctionalCorrectness"], "Proof": null },
    { "Number": "3", "Proof": null, "Text Answer": null }
]"#;

fn provider() -> InMemorySpecProvider {
    InMemorySpecProvider::new().with_spec(AssignmentSpec::from_json_str("1", SPEC).unwrap())
}

fn doc(body: &str) -> String {
    format!("{HEADER}{body}")
}

fn lint_kinds(text: &str) -> Vec<(DiagnosticKind, u32)> {
    lint(text, &provider(), &CompileOptions::default())
        .into_iter()
        .map(|d| (d.kind, d.line))
        .collect()
}

fn compile_err(text: &str) -> (DiagnosticKind, u32) {
    match compile(text, &provider(), &CompileOptions::default()) {
        Err(CompileError::Rejected { diagnostic, .. }) => (diagnostic.kind, diagnostic.line),
        other => panic!("expected a rejection, got {:?}", other),
    }
}

#[test]
fn header_scenario() {
    let document = compile(HEADER, &provider(), &CompileOptions::default()).unwrap();
    assert!(document.header.is_complete());
    assert_eq!(document.header.assignment_number.as_deref(), Some("1"));
    assert!(document.problems.is_empty());
}

#[test]
fn well_formed_document_is_complete() {
    let text = doc("\
<<problem 1: Maximum
<<blueprint
<<functional-correctness
Requires: xs is not empty
Ensures: result is the largest element of xs
functional-correctness>>
<<input-output
Input: [3; 1; 2]
Output: 3
input-output>>
<<complexity
Time: O(n)
complexity>>
blueprint>>
<<operational-steps
step 1: keep the head as the maximum
step 2: compare it with every later element
operational-steps>>
<<ocaml-code
let rec max_list = function
  | [x] -> x
  | x :: rest -> max x (max_list rest)
  | [] -> invalid_arg \"max_list\"
ocaml-code>>
problem>>

<<problem 3: Termination
<<proof helper: loop bound
<<invariant
Initialisation: i = 0
Maintenance: i < n before each iteration
Termination: i = n
invariant>>
proof>>
<<text-answer Why does it stop?
The gap n - i shrinks every iteration.
text-answer>>
problem>>
");
    assert!(lint_kinds(&text).is_empty(), "{:?}", lint_kinds(&text));
    let document = compile(&text, &provider(), &CompileOptions::default()).unwrap();
    assert!(document.is_complete());
    assert_eq!(document.problems.len(), 2);

    let max = document.problem("1").unwrap();
    assert_eq!(max.title, "Maximum");
    assert!(max.blueprint.as_ref().unwrap().is_complete());
    assert_eq!(max.ocaml_code.as_ref().unwrap().status(), None::<VerificationStatus>);

    let term = document.problem("3").unwrap();
    assert!(term.proofs[0].helper);
    assert_eq!(term.proofs[0].title, "loop bound");
    assert!(matches!(term.proofs[0].variant, Some(ProofVariant::Invariant(_))));
    assert_eq!(term.text_answers[0].title, "Why does it stop?");
}

#[test]
fn functional_correctness_scenario() {
    let text = doc("\
<<problem 2
<<blueprint
<<functional-correctness
Requires: n >= 0
Ensures: result = n * (n + 1) / 2
functional-correctness>>
blueprint>>
problem>>
");
    assert!(lint_kinds(&text).is_empty());
    let document = compile(&text, &provider(), &CompileOptions::default()).unwrap();
    assert!(document.problems[0].blueprint.as_ref().unwrap().is_complete());
}

#[test]
fn shift_like_text_stays_in_the_answer_body() {
    let text = doc("\
<<problem 3
<<text-answer Why
x>>1 halves x
text-answer>>
problem>>
");
    assert!(lint_kinds(&text).is_empty(), "{:?}", lint_kinds(&text));
    let document = compile(&text, &provider(), &CompileOptions::default()).unwrap();
    let answer = &document.problem("3").unwrap().text_answers[0];
    assert_eq!(answer.title, "Why");
    assert!(answer.answer.contains("x>>1 halves x"), "{:?}", answer.answer);
}

#[test]
fn problem_number_without_colon_keeps_the_title() {
    let text = doc("<<problem 2 Sum of naturals\nproblem>>\n");
    let document = compile(&text, &provider(), &CompileOptions::default()).unwrap();
    let problem = document.problem("2").unwrap();
    assert_eq!(problem.title, "Sum of naturals");
}

#[test]
fn illegal_open_is_one_context_error_in_both_modes() {
    let text = doc("\
<<problem 3
<<complexity
Time: O(1)
complexity>>
problem>>
");
    assert_eq!(lint_kinds(&text), vec![(DiagnosticKind::Context, 9)]);
    assert_eq!(compile_err(&text), (DiagnosticKind::Context, 9));
}

#[test]
fn unlisted_blueprint_part_is_a_violation_even_when_well_formed() {
    let text = doc("\
<<problem 2
<<blueprint
<<functional-correctness
Requires: a
Ensures: b
functional-correctness>>
<<complexity
Time: O(n)
complexity>>
blueprint>>
problem>>
");
    assert_eq!(lint_kinds(&text), vec![(DiagnosticKind::SpecViolation, 14)]);
    assert_eq!(compile_err(&text), (DiagnosticKind::SpecViolation, 14));
}

#[test]
fn trailing_input_breaks_alternation() {
    let text = doc("\
<<problem 1
<<blueprint
<<input-output
Input: 1
Output: 1
Input: 2
input-output>>
blueprint>>
problem>>
");
    assert_eq!(lint_kinds(&text), vec![(DiagnosticKind::Alternation, 14)]);
    assert_eq!(compile_err(&text), (DiagnosticKind::Alternation, 14));
}

#[test]
fn induction_order() {
    let wrong = doc("\
<<problem 2
<<proof: sum
<<induction
Hypothesis: holds for k
BaseCase: holds for 0
Step: holds for k + 1
induction>>
proof>>
problem>>
");
    assert_eq!(
        lint_kinds(&wrong),
        vec![(DiagnosticKind::Order, 11), (DiagnosticKind::Order, 13)]
    );

    let right = doc("\
<<problem 2
<<proof: sum
<<induction
BaseCase: holds for 0
Hypothesis: holds for k
Step: holds for k + 1
induction>>
proof>>
problem>>
");
    let document = compile(&right, &provider(), &CompileOptions::default()).unwrap();
    assert!(document.problems[0].proofs[0].is_complete());
}

#[test]
fn forbidden_blueprint_is_discarded_but_still_checked() {
    let text = doc("\
<<problem 3
<<blueprint
<<complexity
Memory: O(1)
complexity>>
blueprint>>
problem>>
");
    assert_eq!(
        lint_kinds(&text),
        vec![(DiagnosticKind::SpecViolation, 9), (DiagnosticKind::UnknownKey, 11)]
    );
    assert_eq!(compile_err(&text), (DiagnosticKind::SpecViolation, 9));
}

#[test]
fn steps_are_numbered_in_order_of_appearance() {
    let text = doc("\
<<problem 1
<<operational-steps
step 7: first
step 2: second
operational-steps>>
problem>>
");
    let document = compile(&text, &provider(), &CompileOptions::default()).unwrap();
    let steps = &document.problems[0].operational_steps.as_ref().unwrap().steps;
    assert_eq!(steps, &vec!["first".to_string(), "second".to_string()]);
}

#[test]
fn step_references_out_of_range_warn_without_failing() {
    let text = doc("\
<<problem 1
<<operational-steps
step 1: repeat from step 4
operational-steps>>
problem>>
");
    let diagnostics = lint(&text, &provider(), &CompileOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Reference);
    assert_eq!(diagnostics[0].line, 10);
    assert!(!diagnostics[0].is_error());
    assert!(compile(&text, &provider(), &CompileOptions::default()).is_ok());
}

#[test]
fn missing_required_blueprint_parts_are_named() {
    let text = doc("\
<<problem 1
<<blueprint
<<complexity
Time: O(n)
complexity>>
blueprint>>
problem>>
");
    let diagnostics = lint(&text, &provider(), &CompileOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Completeness);
    assert_eq!(diagnostics[0].line, 9);
    assert!(diagnostics[0].message.contains("FunctionalCorrectness"));
    assert!(diagnostics[0].message.contains("Input-Output"));
}

#[test]
fn problem_without_header_stops_both_modes() {
    let text = "<<problem 1\n<<lemma\nproblem>>\n";
    assert_eq!(lint_kinds(text), vec![(DiagnosticKind::SpecUnavailable, 1)]);
    assert_eq!(compile_err(text), (DiagnosticKind::SpecUnavailable, 1));
}

#[test]
fn unknown_problem_number() {
    let text = doc("<<problem 9\nproblem>>\n");
    assert_eq!(lint_kinds(&text), vec![(DiagnosticKind::SpecViolation, 8)]);
}

#[test]
fn unclosed_sections_at_end_of_input() {
    let text = doc("<<problem 2\n<<proof\n");
    assert_eq!(
        lint_kinds(&text),
        vec![
            (DiagnosticKind::UnclosedSection, 9),
            (DiagnosticKind::UnclosedSection, 8)
        ]
    );
}

#[test]
fn compile_keeps_warnings_seen_before_the_error() {
    let text = doc("stray words\n<<problem 9\nproblem>>\n");
    match compile(&text, &provider(), &CompileOptions::default()) {
        Err(CompileError::Rejected { diagnostic, warnings }) => {
            assert_eq!(diagnostic.kind, DiagnosticKind::SpecViolation);
            assert_eq!(warnings.len(), 1);
            assert_eq!(warnings[0].kind, DiagnosticKind::StrayContent);
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
}

#[test]
fn lint_is_deterministic_and_total() {
    let inputs = [
        "",
        ">>",
        "<<",
        "<<<<header>>",
        "header>>\nheader>>",
        "<<problem\n<<problem 1\nproblem>>\nproblem>>",
        "<<header\nheader>>\n<<problem 1",
        "\u{feff}<<header\nName: é\nheader>>",
        "<<ocaml-code\nlet x = 1\n",
        "<<proof\n<<induction\n<<invariant\nproof>>",
        "input: x\nstep 99\n: :\n<<text-answer",
    ];
    for input in inputs {
        let first = lint(input, &provider(), &CompileOptions::default());
        let second = lint(input, &provider(), &CompileOptions::default());
        assert_eq!(first, second, "lint differs for {:?}", input);
        let _ = compile(input, &provider(), &CompileOptions::default());
    }
}
