//! The document state machine.
//!
//! One pass over the lines. Opens are checked in order: nesting context,
//! duplicates, then the assignment spec gate. Each section's body is handed
//! to its parser when the section closes, and the resulting node is attached
//! to its parent. A [`DiagnosticPolicy`] decides whether each diagnostic
//! stops the scan; when it does not, rejected opens still push a discarded
//! frame so their content is checked without reaching the document.

use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

use crate::assignment::{AssignmentSpecProvider, GateError, SpecGate};
use crate::ast::{
    Blueprint, BlueprintPart, Complexity, Document, FunctionalCorrectness, Header, Induction,
    InputOutput, Invariant, OcamlCode, OperationalSteps, Problem, Proof, ProofVariant,
    SectionKind, TextAnswer,
};
use crate::error::{Diagnostic, DiagnosticKind, Span};
use crate::grammar::{classify, problem_meta, proof_meta, CloseTag, LineToken, OpenTag, Tag};
use crate::policy::{DiagnosticPolicy, Flow};
use crate::sections::{self, StepMention};
use crate::source::{split_lines, SourceLine};
use crate::stack::{Frame, SectionStack};

/// Why a build stopped before the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// The policy or a fatal diagnostic stopped the scan. The last
    /// diagnostic is the reason.
    Rejected,
    Cancelled,
}

#[derive(Debug)]
pub struct BuildOutcome {
    /// Present unless the build halted. Rejected sections are not in it.
    pub document: Option<Document>,
    /// Everything reported, in emission order.
    pub diagnostics: Vec<Diagnostic>,
    pub halted: Option<Halt>,
}

pub struct DocumentBuilder<'p, P> {
    policy: P,
    provider: &'p dyn AssignmentSpecProvider,
    cancel: Option<CancellationToken>,
}

impl<'p, P: DiagnosticPolicy> DocumentBuilder<'p, P> {
    pub fn new(policy: P, provider: &'p dyn AssignmentSpecProvider) -> Self {
        DocumentBuilder {
            policy,
            provider,
            cancel: None,
        }
    }

    /// Checked before each problem is opened.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn build(self, text: &str) -> BuildOutcome {
        let lines = split_lines(text);
        let mut scanner = Scanner {
            policy: self.policy,
            provider: self.provider,
            cancel: self.cancel,
            stack: SectionStack::new(),
            gate: SpecGate::default(),
            header_seen: false,
            header: None,
            problems: Vec::new(),
            problem_numbers: HashSet::new(),
            diagnostics: Vec::new(),
            error_count: 0,
        };
        let halted = scanner.run(&lines).err();
        if let Some(halt) = halted {
            tracing::debug!(policy = scanner.policy.name(), ?halt, "scan halted");
        }
        let document = halted.is_none().then(|| Document {
            header: scanner.header.take().unwrap_or_default(),
            problems: std::mem::take(&mut scanner.problems),
        });
        BuildOutcome {
            document,
            diagnostics: scanner.diagnostics,
            halted,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LeafKind {
    FunctionalCorrectness,
    InputOutput,
    Complexity,
    OperationalSteps,
    OcamlCode,
    Induction,
    Invariant,
}

struct ProblemDraft {
    problem: Problem,
    /// Non-repeatable child tags already opened.
    opened: HashSet<Tag>,
    mentions: Vec<StepMention>,
    step_count: usize,
}

struct BlueprintDraft {
    problem: String,
    blueprint: Blueprint,
    opened: HashSet<BlueprintPart>,
}

struct ProofDraft {
    proof: Proof,
    variant_opened: bool,
}

enum Node<'t> {
    Header(Vec<SourceLine<'t>>),
    Problem(ProblemDraft),
    Blueprint(BlueprintDraft),
    Proof(ProofDraft),
    TextAnswer {
        title: String,
        body: Vec<SourceLine<'t>>,
    },
    Leaf(LeafKind, Vec<SourceLine<'t>>),
}

struct Section<'t> {
    node: Node<'t>,
    /// Error count when the open tag was reached.
    errors_at_open: usize,
}

/// A parsed node waiting to be attached to its parent.
enum Done {
    Header(Header),
    Problem(ProblemDraft),
    Blueprint(Blueprint),
    FunctionalCorrectness(FunctionalCorrectness),
    InputOutput(InputOutput),
    Complexity(Complexity),
    OperationalSteps(OperationalSteps),
    OcamlCode(OcamlCode),
    Proof(Proof),
    Induction(Induction),
    Invariant(Invariant),
    TextAnswer(TextAnswer),
}

struct Scanner<'t, 'p, P> {
    policy: P,
    provider: &'p dyn AssignmentSpecProvider,
    cancel: Option<CancellationToken>,
    stack: SectionStack<Section<'t>>,
    gate: SpecGate,
    header_seen: bool,
    header: Option<Header>,
    problems: Vec<Problem>,
    problem_numbers: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

fn context_message(tag: Tag, parent: Option<Tag>) -> String {
    let found = match parent {
        Some(p) => format!("inside '<<{}'", p),
        None => "at top level".to_string(),
    };
    match tag.legal_parent() {
        Some(legal) => format!("'<<{}' must be directly inside '<<{}', found {}", tag, legal, found),
        None => format!("'<<{}' is only allowed at top level, found {}", tag, found),
    }
}

fn join_parts(parts: impl IntoIterator<Item = BlueprintPart>) -> String {
    let names: Vec<_> = parts.into_iter().map(BlueprintPart::spec_name).collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

impl<'t, P: DiagnosticPolicy> Scanner<'t, '_, P> {
    fn run(&mut self, lines: &[SourceLine<'t>]) -> Result<(), Halt> {
        for line in lines {
            let token = classify(line.text());
            if self.stack.top_tag() == Some(Tag::OcamlCode) && !matches!(token, LineToken::Close(_)) {
                self.text(*line)?;
                continue;
            }
            match token {
                LineToken::Open(open) => self.open(line, open)?,
                LineToken::Close(close) => self.close(line, close)?,
                LineToken::Malformed(m) => {
                    self.emit(Diagnostic::error(
                        DiagnosticKind::MalformedTag,
                        line.number,
                        line.span_of(m.range),
                        m.message,
                    ))?;
                }
                LineToken::Text => self.text(*line)?,
            }
        }
        self.finish_input(lines.len())
    }

    fn emit(&mut self, diagnostic: Diagnostic) -> Result<(), Halt> {
        let flow = self.policy.on_diagnostic(&diagnostic);
        let fatal = diagnostic.kind.is_fatal();
        if diagnostic.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
        if fatal || flow == Flow::Halt {
            Err(Halt::Rejected)
        } else {
            Ok(())
        }
    }

    fn reject(
        &mut self,
        kind: DiagnosticKind,
        line: &SourceLine<'_>,
        span: Span,
        tag: Tag,
        message: String,
    ) -> Result<(), Halt> {
        self.emit(Diagnostic::error(kind, line.number, span, message).with_tag(tag.name()))
    }

    fn check_cancelled(&self) -> Result<(), Halt> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(Halt::Cancelled),
            _ => Ok(()),
        }
    }

    fn text(&mut self, line: SourceLine<'t>) -> Result<(), Halt> {
        if let Some(frame) = self.stack.top_mut() {
            match &mut frame.node.node {
                Node::Header(body) | Node::Leaf(_, body) | Node::TextAnswer { body, .. } => {
                    body.push(line);
                    return Ok(());
                }
                Node::Problem(_) | Node::Blueprint(_) | Node::Proof(_) => {}
            }
        }
        if line.is_blank() {
            return Ok(());
        }
        let place = match self.stack.top_tag() {
            Some(tag) => format!("directly inside '<<{}'", tag),
            None => "outside of any section".to_string(),
        };
        self.emit(Diagnostic::warning(
            DiagnosticKind::StrayContent,
            line.number,
            line.full_span(),
            format!("text {} is ignored", place),
        ))
    }

    fn problem_number(&self) -> String {
        self.stack
            .iter()
            .rev()
            .find_map(|f| match &f.node.node {
                Node::Problem(d) => Some(d.problem.number.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn gate_error(
        &mut self,
        line: &SourceLine<'_>,
        span: Span,
        tag: Tag,
        err: GateError,
    ) -> Result<(), Halt> {
        let kind = match err {
            GateError::Unavailable(_) => DiagnosticKind::SpecUnavailable,
            GateError::UnknownProblem { .. } => DiagnosticKind::SpecViolation,
        };
        self.reject(kind, line, span, tag, format!("cannot admit '<<{}': {}", tag, err))
    }

    /// Metadata on a tag that takes none is reported and ignored.
    fn no_metadata(&mut self, line: &SourceLine<'_>, open: &OpenTag<'_>) -> Result<(), Halt> {
        if open.metadata.is_empty() {
            return Ok(());
        }
        let text = line.text();
        let span = line.span_of(text.len() - open.metadata.len()..text.len());
        self.emit(
            Diagnostic::warning(
                DiagnosticKind::MalformedTag,
                line.number,
                span,
                format!("'<<{}' takes no metadata; '{}' is ignored", open.tag, open.metadata),
            )
            .with_tag(open.tag.name()),
        )
    }

    fn new_node(&self, tag: Tag, metadata: &str, discarded: bool) -> Node<'t> {
        match tag {
            Tag::Header => Node::Header(Vec::new()),
            Tag::Problem => {
                let (number, title) = problem_meta(metadata)
                    .map(|m| (m.number.to_string(), m.title.to_string()))
                    .unwrap_or_default();
                Node::Problem(ProblemDraft {
                    problem: Problem {
                        number,
                        title,
                        ..Problem::default()
                    },
                    opened: HashSet::new(),
                    mentions: Vec::new(),
                    step_count: 0,
                })
            }
            Tag::Blueprint => {
                let problem = self.problem_number();
                let required = if discarded {
                    Default::default()
                } else {
                    self.gate
                        .allowed_blueprint_subsections(&problem)
                        .unwrap_or_default()
                };
                Node::Blueprint(BlueprintDraft {
                    problem,
                    blueprint: Blueprint {
                        required,
                        ..Blueprint::default()
                    },
                    opened: HashSet::new(),
                })
            }
            Tag::Proof => {
                let (helper, title) = proof_meta(metadata);
                Node::Proof(ProofDraft {
                    proof: Proof {
                        helper,
                        title: title.to_string(),
                        variant: None,
                    },
                    variant_opened: false,
                })
            }
            Tag::TextAnswer => Node::TextAnswer {
                title: metadata.to_string(),
                body: Vec::new(),
            },
            Tag::FunctionalCorrectness => Node::Leaf(LeafKind::FunctionalCorrectness, Vec::new()),
            Tag::InputOutput => Node::Leaf(LeafKind::InputOutput, Vec::new()),
            Tag::Complexity => Node::Leaf(LeafKind::Complexity, Vec::new()),
            Tag::OperationalSteps => Node::Leaf(LeafKind::OperationalSteps, Vec::new()),
            Tag::OcamlCode => Node::Leaf(LeafKind::OcamlCode, Vec::new()),
            Tag::Induction => Node::Leaf(LeafKind::Induction, Vec::new()),
            Tag::Invariant => Node::Leaf(LeafKind::Invariant, Vec::new()),
        }
    }

    fn open(&mut self, line: &SourceLine<'t>, open: OpenTag<'t>) -> Result<(), Halt> {
        let tag = open.tag;
        let span = line.span_of(open.name_range.clone());
        let errors_at_open = self.error_count;
        let parent = self.stack.top_tag();
        tracing::debug!(tag = %tag, line = line.number, "open section");

        let discarded = if tag.is_legal_in(parent) {
            self.admit(line, span, &open)?
        } else {
            self.reject(DiagnosticKind::Context, line, span, tag, context_message(tag, parent))?;
            true
        };

        let node = self.new_node(tag, open.metadata, discarded);
        self.stack.push(Frame {
            tag,
            line: line.number,
            name_span: span,
            discarded,
            node: Section {
                node,
                errors_at_open,
            },
        });
        Ok(())
    }

    /// Duplicate, metadata and gate checks for a tag that is legal where it
    /// appears. Returns whether the new frame is discarded.
    fn admit(&mut self, line: &SourceLine<'_>, span: Span, open: &OpenTag<'_>) -> Result<bool, Halt> {
        let tag = open.tag;
        let mut discarded = self.stack.in_discarded();

        match tag {
            Tag::Header => {
                if self.header_seen {
                    self.reject(
                        DiagnosticKind::DuplicateOpen,
                        line,
                        span,
                        tag,
                        "the document already has a '<<header'".to_string(),
                    )?;
                    discarded = true;
                }
                self.header_seen = true;
                self.no_metadata(line, open)?;
            }
            Tag::Problem => {
                self.check_cancelled()?;
                match problem_meta(open.metadata) {
                    None => {
                        self.reject(
                            DiagnosticKind::MalformedTag,
                            line,
                            span,
                            tag,
                            "'<<problem' needs a number, as in '<<problem 1: Title'".to_string(),
                        )?;
                        discarded = true;
                    }
                    Some(meta) => {
                        if !self.problem_numbers.insert(meta.number.to_string()) {
                            self.reject(
                                DiagnosticKind::DuplicateOpen,
                                line,
                                span,
                                tag,
                                format!("problem {} is already defined", meta.number),
                            )?;
                            discarded = true;
                        } else if let Err(err) = self.gate.check_problem(meta.number) {
                            discarded = true;
                            self.gate_error(line, span, tag, err)?;
                        }
                    }
                }
            }
            Tag::Blueprint
            | Tag::OperationalSteps
            | Tag::OcamlCode
            | Tag::Proof
            | Tag::TextAnswer => {
                let duplicate = match self.stack.top_mut().map(|f| &mut f.node.node) {
                    Some(Node::Problem(d)) => !tag.is_repeatable() && !d.opened.insert(tag),
                    _ => false,
                };
                if duplicate {
                    self.reject(
                        DiagnosticKind::DuplicateOpen,
                        line,
                        span,
                        tag,
                        format!("this problem already has a '<<{}'", tag),
                    )?;
                    discarded = true;
                }
                if !discarded {
                    if let Some(kind) = SectionKind::from_tag(tag) {
                        let number = self.problem_number();
                        match self.gate.is_section_allowed(&number, kind) {
                            Ok(true) => {}
                            Ok(false) => {
                                self.reject(
                                    DiagnosticKind::SpecViolation,
                                    line,
                                    span,
                                    tag,
                                    format!("problem {} does not allow '<<{}'", number, tag),
                                )?;
                                discarded = true;
                            }
                            Err(err) => {
                                discarded = true;
                                self.gate_error(line, span, tag, err)?;
                            }
                        }
                    }
                }
                match tag {
                    Tag::TextAnswer if open.metadata.is_empty() => {
                        self.reject(
                            DiagnosticKind::MalformedTag,
                            line,
                            span,
                            tag,
                            "'<<text-answer' needs a title, as in '<<text-answer Why does it halt?'"
                                .to_string(),
                        )?;
                    }
                    Tag::Proof | Tag::TextAnswer => {}
                    _ => self.no_metadata(line, open)?,
                }
            }
            Tag::FunctionalCorrectness | Tag::InputOutput | Tag::Complexity => {
                let checked = match (self.stack.top_mut().map(|f| &mut f.node.node), BlueprintPart::from_tag(tag)) {
                    (Some(Node::Blueprint(d)), Some(part)) => Some((
                        !d.opened.insert(part),
                        d.blueprint.required.contains(&part),
                        d.problem.clone(),
                        join_parts(d.blueprint.required.iter().copied()),
                    )),
                    _ => None,
                };
                if let Some((duplicate, allowed, problem, allowed_parts)) = checked {
                    if duplicate {
                        self.reject(
                            DiagnosticKind::DuplicateOpen,
                            line,
                            span,
                            tag,
                            format!("this blueprint already has a '<<{}'", tag),
                        )?;
                        discarded = true;
                    } else if !discarded && !allowed {
                        self.reject(
                            DiagnosticKind::SpecViolation,
                            line,
                            span,
                            tag,
                            format!(
                                "problem {} does not allow '<<{}' in its blueprint (allowed: {})",
                                problem, tag, allowed_parts
                            ),
                        )?;
                        discarded = true;
                    }
                }
                self.no_metadata(line, open)?;
            }
            Tag::Induction | Tag::Invariant => {
                let duplicate = match self.stack.top_mut().map(|f| &mut f.node.node) {
                    Some(Node::Proof(d)) => std::mem::replace(&mut d.variant_opened, true),
                    _ => false,
                };
                if duplicate {
                    self.reject(
                        DiagnosticKind::DuplicateOpen,
                        line,
                        span,
                        tag,
                        "a proof holds exactly one '<<induction' or '<<invariant'".to_string(),
                    )?;
                    discarded = true;
                }
                self.no_metadata(line, open)?;
            }
        }
        Ok(discarded)
    }

    fn close(&mut self, line: &SourceLine<'t>, close: CloseTag) -> Result<(), Halt> {
        let span = line.span_of(close.name_range);
        let Some(closed) = self.stack.close(close.tag) else {
            return self.reject(
                DiagnosticKind::UnmatchedClose,
                line,
                span,
                close.tag,
                format!("'{}>>' does not close any open section", close.tag),
            );
        };
        for orphan in closed.orphans {
            self.unclosed(
                &orphan,
                format!("it was cut off by '{}>>' on line {}", close.tag, line.number),
            )?;
        }
        self.finish(closed.frame, line)
    }

    fn unclosed(&mut self, frame: &Frame<Section<'t>>, reason: String) -> Result<(), Halt> {
        self.emit(
            Diagnostic::error(
                DiagnosticKind::UnclosedSection,
                frame.line,
                frame.name_span,
                format!("'<<{}' is never closed; {}", frame.tag, reason),
            )
            .with_tag(frame.tag.name()),
        )
    }

    fn finish(&mut self, frame: Frame<Section<'t>>, close: &SourceLine<'t>) -> Result<(), Halt> {
        let Frame {
            tag,
            line,
            name_span,
            discarded,
            node: Section {
                node,
                errors_at_open,
            },
        } = frame;
        tracing::debug!(tag = %tag, open = line, close = close.number, discarded, "close section");

        let mut diags = Vec::new();
        let mut mentions = Vec::new();
        let (done, missing) = match node {
            Node::Header(body) => {
                let header = sections::parse_header(&body, &mut diags);
                let missing = header.missing();
                let missing = (!missing.is_empty())
                    .then(|| format!("'<<header' is missing {}", missing.join(", ")));
                (Done::Header(header), missing)
            }
            Node::Problem(draft) => (Done::Problem(draft), None),
            Node::Blueprint(draft) => {
                let missing = draft.blueprint.missing();
                let missing = (!missing.is_empty()).then(|| {
                    format!(
                        "'<<blueprint' of problem {} is missing required part(s): {}",
                        draft.problem,
                        join_parts(missing)
                    )
                });
                (Done::Blueprint(draft.blueprint), missing)
            }
            Node::Proof(draft) => {
                let missing = draft
                    .proof
                    .variant
                    .is_none()
                    .then(|| "'<<proof' needs an '<<induction' or '<<invariant' section".to_string());
                (Done::Proof(draft.proof), missing)
            }
            Node::TextAnswer { title, body } => {
                mentions = sections::collect_step_mentions(&body, false);
                let answer = sections::parse_text_answer(&title, &body);
                let missing = answer
                    .answer
                    .is_empty()
                    .then(|| "'<<text-answer' has no answer text".to_string());
                (Done::TextAnswer(answer), missing)
            }
            Node::Leaf(kind, body) => {
                let (done, missing) = match kind {
                    LeafKind::FunctionalCorrectness => {
                        let fc = sections::parse_functional_correctness(&body, &mut diags);
                        let missing = fc.missing();
                        (Done::FunctionalCorrectness(fc), missing_fields(tag, &missing))
                    }
                    LeafKind::InputOutput => {
                        let io = sections::parse_input_output(&body, close, &mut diags);
                        let missing = io.missing();
                        let message = missing_fields(tag, &missing).or_else(|| {
                            (io.inputs.len() != io.outputs.len()).then(|| {
                                format!(
                                    "'<<input-output' has {} Input(s) but {} Output(s)",
                                    io.inputs.len(),
                                    io.outputs.len()
                                )
                            })
                        });
                        (Done::InputOutput(io), message)
                    }
                    LeafKind::Complexity => {
                        let c = sections::parse_complexity(&body, &mut diags);
                        let missing = c.missing();
                        (Done::Complexity(c), missing_fields(tag, &missing))
                    }
                    LeafKind::OperationalSteps => {
                        mentions = sections::collect_step_mentions(&body, true);
                        let steps = sections::parse_operational_steps(&body, &mut diags);
                        let missing = (!steps.is_complete())
                            .then(|| "'<<operational-steps' has no 'step:' entries".to_string());
                        (Done::OperationalSteps(steps), missing)
                    }
                    LeafKind::OcamlCode => {
                        let code = sections::parse_ocaml_code(&body);
                        let missing = (!code.is_complete())
                            .then(|| "'<<ocaml-code' is empty".to_string());
                        (Done::OcamlCode(code), missing)
                    }
                    LeafKind::Induction => {
                        mentions = sections::collect_step_mentions(&body, false);
                        let ind = sections::parse_induction(&body, &mut diags);
                        let missing = ind.missing();
                        (Done::Induction(ind), missing_fields(tag, &missing))
                    }
                    LeafKind::Invariant => {
                        mentions = sections::collect_step_mentions(&body, false);
                        let inv = sections::parse_invariant(&body, &mut diags);
                        let missing = inv.missing();
                        (Done::Invariant(inv), missing_fields(tag, &missing))
                    }
                };
                (done, missing)
            }
        };

        for d in diags {
            self.emit(d)?;
        }
        if let Some(message) = missing {
            if self.error_count == errors_at_open {
                self.emit(
                    Diagnostic::error(DiagnosticKind::Completeness, line, name_span, message)
                        .with_tag(tag.name()),
                )?;
            }
        }
        if !mentions.is_empty() {
            if let Some(Node::Problem(d)) = self.stack.nearest_mut(Tag::Problem).map(|f| &mut f.node.node) {
                d.mentions.extend(mentions);
            }
        }
        self.attach(done, discarded)
    }

    fn attach(&mut self, done: Done, discarded: bool) -> Result<(), Halt> {
        match done {
            Done::Header(header) => {
                if !discarded {
                    self.gate = self.load_gate(&header);
                    self.header = Some(header);
                }
            }
            Done::Problem(draft) => {
                let warnings =
                    sections::check_step_mentions(&draft.mentions, draft.step_count, &draft.problem.number);
                for warning in warnings {
                    self.emit(warning.with_tag(Tag::Problem.name()))?;
                }
                if !discarded {
                    tracing::debug!(problem = %draft.problem.number, complete = draft.problem.is_complete(), "problem built");
                    self.problems.push(draft.problem);
                }
            }
            done => {
                let Some(parent) = self.stack.top_mut() else {
                    return Ok(());
                };
                if let (Node::Problem(d), Done::OperationalSteps(steps)) = (&mut parent.node.node, &done) {
                    d.step_count = steps.steps.len();
                }
                if discarded {
                    return Ok(());
                }
                match (&mut parent.node.node, done) {
                    (Node::Problem(d), Done::Blueprint(b)) => d.problem.blueprint = Some(b),
                    (Node::Problem(d), Done::OperationalSteps(s)) => d.problem.operational_steps = Some(s),
                    (Node::Problem(d), Done::OcamlCode(c)) => d.problem.ocaml_code = Some(c),
                    (Node::Problem(d), Done::Proof(p)) => d.problem.proofs.push(p),
                    (Node::Problem(d), Done::TextAnswer(t)) => d.problem.text_answers.push(t),
                    (Node::Blueprint(d), Done::FunctionalCorrectness(fc)) => {
                        d.blueprint.functional_correctness = Some(fc)
                    }
                    (Node::Blueprint(d), Done::InputOutput(io)) => d.blueprint.input_output = Some(io),
                    (Node::Blueprint(d), Done::Complexity(c)) => d.blueprint.complexity = Some(c),
                    (Node::Proof(d), Done::Induction(i)) => {
                        d.proof.variant = Some(ProofVariant::Induction(i))
                    }
                    (Node::Proof(d), Done::Invariant(i)) => {
                        d.proof.variant = Some(ProofVariant::Invariant(i))
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn load_gate(&self, header: &Header) -> SpecGate {
        let missing = header.missing();
        if !missing.is_empty() {
            return SpecGate::unavailable(format!(
                "the header is incomplete (missing {})",
                missing.join(", ")
            ));
        }
        let Some(number) = header.assignment_number.as_deref() else {
            return SpecGate::unavailable("the header's Assignment has no number");
        };
        match self.provider.load(number) {
            Ok(spec) => {
                tracing::debug!(assignment = number, problems = spec.problems.len(), "assignment spec loaded");
                SpecGate::loaded(spec)
            }
            Err(err) => {
                tracing::debug!(assignment = number, error = %err, "assignment spec unavailable");
                SpecGate::unavailable(err.to_string())
            }
        }
    }

    fn finish_input(&mut self, line_count: usize) -> Result<(), Halt> {
        for frame in self.stack.drain() {
            self.unclosed(&frame, "the document ended first".to_string())?;
        }
        if !self.header_seen {
            self.emit(Diagnostic::error(
                DiagnosticKind::MissingHeader,
                line_count.max(1) as u32,
                Span::default(),
                "the document has no '<<header' section",
            ))?;
        }
        Ok(())
    }
}

fn missing_fields(tag: Tag, missing: &[&str]) -> Option<String> {
    (!missing.is_empty()).then(|| format!("'<<{}' is missing {}", tag, missing.join(", ")))
}
