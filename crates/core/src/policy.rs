//! Whether a diagnostic stops the scan.
//!
//! `compile` runs with [`FailFast`], `lint` with [`CollectAndContinue`].
//! Fatal kinds stop the scan regardless of the policy.

use crate::error::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

pub trait DiagnosticPolicy {
    fn on_diagnostic(&mut self, diagnostic: &Diagnostic) -> Flow;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Stop at the first error. Warnings pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl DiagnosticPolicy for FailFast {
    fn on_diagnostic(&mut self, diagnostic: &Diagnostic) -> Flow {
        if diagnostic.is_error() {
            Flow::Halt
        } else {
            Flow::Continue
        }
    }

    fn name(&self) -> &'static str {
        "fail-fast"
    }
}

/// Never stop; the builder recovers locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectAndContinue;

impl DiagnosticPolicy for CollectAndContinue {
    fn on_diagnostic(&mut self, _diagnostic: &Diagnostic) -> Flow {
        Flow::Continue
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}
