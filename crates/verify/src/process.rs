//! Verifier backed by an external OCaml toolchain.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use ics_core::ast::Verification;
use ics_core::config::VerifierConfig;

use crate::{CodeVerifier, VerifyError};

const SOURCE_FILE: &str = "solution.ml";

/// Writes each block to a temporary `.ml` file and runs
/// `program args... <file>`. Exit status 0 means verified; the output kept
/// is stdout on success and stderr on failure.
#[derive(Debug, Clone)]
pub struct OcamlVerifier {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl OcamlVerifier {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        OcamlVerifier {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &VerifierConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone(), config.timeout())
    }

    /// Run the checker once. Errors mean the checker itself could not be
    /// run to completion.
    pub async fn check(&self, code: &str) -> Result<Verification, VerifyError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(SOURCE_FILE);
        tokio::fs::write(&path, code).await?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(&path)
            .current_dir(dir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program = %self.program, timeout_secs = self.timeout.as_secs(), "running verifier");
        let child = cmd.spawn().map_err(|source| VerifyError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // On timeout the child is dropped, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| VerifyError::Timeout(self.timeout))??;

        if output.status.success() {
            Ok(Verification::verified(String::from_utf8_lossy(&output.stdout).trim_end()))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            let raw_output = if stderr.is_empty() {
                format!("verifier exited with {}", output.status)
            } else {
                stderr
            };
            Ok(Verification::failed(raw_output))
        }
    }
}

#[async_trait]
impl CodeVerifier for OcamlVerifier {
    async fn verify(&self, code: &str) -> Verification {
        match self.check(code).await {
            Ok(verification) => verification,
            Err(err) => {
                warn!(program = %self.program, error = %err, "verifier did not complete");
                Verification::failed(err.to_string())
            }
        }
    }

    fn verifier_id(&self) -> &str {
        &self.program
    }
}
