//! The two ways to consume a document: `compile` stops at the first error,
//! `lint` reports everything.

use tokio_util::sync::CancellationToken;

use crate::assignment::AssignmentSpecProvider;
use crate::ast::Document;
use crate::builder::{DocumentBuilder, Halt};
use crate::error::{CompileError, Diagnostic};
use crate::policy::{CollectAndContinue, DiagnosticPolicy, FailFast};

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Checked before each problem.
    pub cancel: Option<CancellationToken>,
}

impl CompileOptions {
    pub fn with_cancellation(token: CancellationToken) -> Self {
        CompileOptions {
            cancel: Some(token),
        }
    }
}

fn builder<'p, P: DiagnosticPolicy>(
    policy: P,
    provider: &'p dyn AssignmentSpecProvider,
    options: &CompileOptions,
) -> DocumentBuilder<'p, P> {
    let builder = DocumentBuilder::new(policy, provider);
    match &options.cancel {
        Some(token) => builder.with_cancellation(token.clone()),
        None => builder,
    }
}

/// Build a document, or return the first error. Warnings seen before the
/// error travel with it.
pub fn compile(
    text: &str,
    provider: &dyn AssignmentSpecProvider,
    options: &CompileOptions,
) -> Result<Document, CompileError> {
    let _span = tracing::info_span!("compile", bytes = text.len()).entered();
    let outcome = builder(FailFast, provider, options).build(text);
    match outcome.halted {
        None => {
            let document = outcome.document.unwrap_or_default();
            tracing::info!(
                problems = document.problems.len(),
                warnings = outcome.diagnostics.len(),
                "compiled"
            );
            Ok(document)
        }
        Some(Halt::Cancelled) => {
            tracing::info!("compile cancelled");
            Err(CompileError::Cancelled)
        }
        Some(Halt::Rejected) => {
            let mut warnings = outcome.diagnostics;
            match warnings.pop() {
                Some(diagnostic) => {
                    tracing::info!(line = diagnostic.line, kind = diagnostic.kind.code(), "compile rejected");
                    Err(CompileError::Rejected {
                        diagnostic,
                        warnings,
                    })
                }
                None => Err(CompileError::Cancelled),
            }
        }
    }
}

/// Every diagnostic for the document, in the order found. Only a missing
/// assignment spec or cancellation cuts the list short.
pub fn lint(
    text: &str,
    provider: &dyn AssignmentSpecProvider,
    options: &CompileOptions,
) -> Vec<Diagnostic> {
    let _span = tracing::info_span!("lint", bytes = text.len()).entered();
    let outcome = builder(CollectAndContinue, provider, options).build(text);
    let errors = outcome.diagnostics.iter().filter(|d| d.is_error()).count();
    tracing::info!(
        errors,
        warnings = outcome.diagnostics.len() - errors,
        halted = outcome.halted.is_some(),
        "linted"
    );
    outcome.diagnostics
}
