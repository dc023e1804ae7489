use std::path::Path;
use std::process;
use std::sync::Arc;

use ics_core::assignment::DirectorySpecProvider;
use ics_core::ast::VerificationStatus;
use ics_core::{CompileError, CompileOptions, Document};
use ics_verify::{verify_document, OcamlVerifier, VerifyOptions, VerifyReport};
use tokio_util::sync::CancellationToken;

use super::{format_diagnostic, read_source};
use crate::settings::Settings;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_compile(file: &Path, settings: &Settings, output: OutputFormat, quiet: bool) {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let provider = DirectorySpecProvider::new(&settings.spec_dir);
    let mut document = match ics_core::compile(&source, &provider, &CompileOptions::default()) {
        Ok(doc) => doc,
        Err(e) => {
            report_compile_error(file, &e, output, quiet);
            process::exit(1);
        }
    };

    let report = if settings.config.verifier.enabled {
        match run_verifier(&mut document, settings) {
            Ok(report) => Some(report),
            Err(msg) => {
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        }
    } else {
        None
    };

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&document)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            if !quiet {
                print_summary(file, &document, report.as_ref());
            }
        }
    }

    if report.is_some_and(|r| !r.all_verified()) {
        process::exit(1);
    }
}

fn report_compile_error(file: &Path, err: &CompileError, output: OutputFormat, quiet: bool) {
    match err {
        CompileError::Rejected { diagnostic, warnings } => match output {
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&diagnostic.to_json_value())
                        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", diagnostic))
                );
            }
            OutputFormat::Text => {
                if !quiet {
                    for warning in warnings {
                        eprintln!("{}", format_diagnostic(file, warning));
                    }
                    eprintln!("{}", format_diagnostic(file, diagnostic));
                }
            }
        },
        CompileError::Cancelled => report_error("compilation cancelled", output, quiet),
    }
}

/// Verify every code block, cancelling on Ctrl-C.
fn run_verifier(document: &mut Document, settings: &Settings) -> Result<VerifyReport, String> {
    let verifier = Arc::new(OcamlVerifier::from_config(&settings.config.verifier));
    let options = VerifyOptions {
        parallel: settings.config.verifier.parallel,
    };
    let runtime = tokio::runtime::Runtime::new().map_err(|e| format!("failed to start async runtime: {}", e))?;
    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });
        verify_document(document, verifier, options, &cancel)
            .await
            .map_err(|e| format!("error: {}", e))
    })
}

fn print_summary(file: &Path, document: &Document, report: Option<&VerifyReport>) {
    let header = &document.header;
    println!(
        "{}: assignment {} by {}, {} problem(s)",
        file.display(),
        header.assignment_number.as_deref().unwrap_or("?"),
        header.name,
        document.problems.len()
    );
    for problem in &document.problems {
        let code = match problem.ocaml_code.as_ref().map(|c| c.status()) {
            None => "",
            Some(None) => ", code not verified",
            Some(Some(VerificationStatus::Verified)) => ", code verified",
            Some(Some(VerificationStatus::Failed)) => ", code FAILED verification",
        };
        let state = if problem.is_complete() { "complete" } else { "incomplete" };
        println!("  problem {}: {} ({}{})", problem.number, problem.title, state, code);
        if let Some(verification) = problem.ocaml_code.as_ref().and_then(|c| c.verification.as_ref()) {
            if verification.status == VerificationStatus::Failed && !verification.raw_output.is_empty() {
                for line in verification.raw_output.lines() {
                    println!("      {}", line);
                }
            }
        }
    }
    if let Some(report) = report {
        println!(
            "verification: {} verified, {} failed, {} skipped",
            report.verified, report.failed, report.skipped
        );
    }
}
