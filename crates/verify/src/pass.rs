//! Document-level verification pass.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use ics_core::ast::{Verification, VerificationStatus};
use ics_core::Document;

use crate::{CodeVerifier, VerifyError};

#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOptions {
    /// Verify all blocks concurrently instead of one after another.
    pub parallel: bool,
}

/// Counts from one pass over a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub verified: usize,
    pub failed: usize,
    /// Blocks that already carried a verdict.
    pub skipped: usize,
}

impl VerifyReport {
    fn record(&mut self, verdict: &Verification) {
        match verdict.status {
            VerificationStatus::Verified => self.verified += 1,
            VerificationStatus::Failed => self.failed += 1,
        }
    }

    pub fn all_verified(&self) -> bool {
        self.failed == 0
    }
}

/// Run `verifier` over every `ocaml-code` block in `document` that has no
/// verdict yet and record the result on the block.
///
/// On cancellation, verdicts gathered so far stay recorded and
/// [`VerifyError::Cancelled`] is returned.
pub async fn verify_document(
    document: &mut Document,
    verifier: Arc<dyn CodeVerifier>,
    options: VerifyOptions,
    cancel: &CancellationToken,
) -> Result<VerifyReport, VerifyError> {
    let span = info_span!("verify", verifier = verifier.verifier_id(), parallel = options.parallel);
    async move {
        let mut report = VerifyReport::default();
        let mut pending = Vec::new();
        for (index, problem) in document.problems.iter().enumerate() {
            let Some(block) = &problem.ocaml_code else {
                continue;
            };
            if block.verification.is_some() {
                report.skipped += 1;
            } else {
                pending.push((index, block.code.clone()));
            }
        }
        debug!(pending = pending.len(), skipped = report.skipped, "collected code blocks");

        if options.parallel {
            run_parallel(document, verifier, pending, cancel, &mut report).await?;
        } else {
            run_sequential(document, verifier.as_ref(), pending, cancel, &mut report).await?;
        }

        info!(verified = report.verified, failed = report.failed, skipped = report.skipped, "verification finished");
        Ok(report)
    }
    .instrument(span)
    .await
}

fn record(document: &mut Document, index: usize, verdict: Verification, report: &mut VerifyReport) {
    report.record(&verdict);
    let problem = &mut document.problems[index];
    debug!(problem = %problem.number, status = ?verdict.status, "recorded verdict");
    if let Some(block) = problem.ocaml_code.as_mut() {
        block.verification = Some(verdict);
    }
}

async fn run_sequential(
    document: &mut Document,
    verifier: &dyn CodeVerifier,
    pending: Vec<(usize, String)>,
    cancel: &CancellationToken,
    report: &mut VerifyReport,
) -> Result<(), VerifyError> {
    for (index, code) in pending {
        if cancel.is_cancelled() {
            return Err(VerifyError::Cancelled);
        }
        let verdict = tokio::select! {
            verdict = verifier.verify(&code) => verdict,
            _ = cancel.cancelled() => return Err(VerifyError::Cancelled),
        };
        record(document, index, verdict, report);
    }
    Ok(())
}

async fn run_parallel(
    document: &mut Document,
    verifier: Arc<dyn CodeVerifier>,
    pending: Vec<(usize, String)>,
    cancel: &CancellationToken,
    report: &mut VerifyReport,
) -> Result<(), VerifyError> {
    if cancel.is_cancelled() && !pending.is_empty() {
        return Err(VerifyError::Cancelled);
    }
    let mut tasks = JoinSet::new();
    for (index, code) in pending {
        let verifier = Arc::clone(&verifier);
        tasks.spawn(async move { (index, verifier.verify(&code).await) });
    }
    loop {
        tokio::select! {
            joined = tasks.join_next() => match joined {
                Some(result) => {
                    let (index, verdict) = result?;
                    record(document, index, verdict, report);
                }
                None => return Ok(()),
            },
            _ = cancel.cancelled() => {
                tasks.abort_all();
                return Err(VerifyError::Cancelled);
            }
        }
    }
}
