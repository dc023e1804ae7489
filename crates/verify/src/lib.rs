//! ics-verify: runs the code blocks of a compiled document through an
//! external checker and records the verdict on each block.
//!
//! The parser never calls a verifier. Verification is a separate async pass
//! over a finished [`Document`](ics_core::Document).

mod error;
mod pass;
mod process;

pub use error::VerifyError;
pub use pass::{verify_document, VerifyOptions, VerifyReport};
pub use process::OcamlVerifier;

use async_trait::async_trait;
use ics_core::ast::Verification;

/// Something that can judge a piece of OCaml source.
///
/// Implementations never fail: problems running the checker are reported
/// as a [`VerificationStatus::Failed`](ics_core::ast::VerificationStatus)
/// verdict with the reason as output.
#[async_trait]
pub trait CodeVerifier: Send + Sync {
    async fn verify(&self, code: &str) -> Verification;

    /// Short identifier for logs.
    fn verifier_id(&self) -> &str;
}

/// Returns the same verdict for every block. For offline runs and tests.
#[derive(Debug, Clone)]
pub struct StaticVerifier {
    verdict: Verification,
}

impl StaticVerifier {
    pub fn new(verdict: Verification) -> Self {
        StaticVerifier { verdict }
    }

    pub fn verified() -> Self {
        Self::new(Verification::verified(""))
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self::new(Verification::failed(output))
    }
}

#[async_trait]
impl CodeVerifier for StaticVerifier {
    async fn verify(&self, _code: &str) -> Verification {
        self.verdict.clone()
    }

    fn verifier_id(&self) -> &str {
        "static"
    }
}
