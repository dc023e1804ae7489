use std::path::Path;
use std::process;

use ics_core::assignment::DirectorySpecProvider;
use ics_core::CompileOptions;

use super::{format_diagnostic, read_source};
use crate::settings::Settings;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_lint(file: &Path, settings: &Settings, output: OutputFormat, quiet: bool) {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let provider = DirectorySpecProvider::new(&settings.spec_dir);
    let diagnostics = ics_core::lint(&source, &provider, &CompileOptions::default());
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();

    match output {
        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = diagnostics.iter().map(|d| d.to_json_value()).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e))
            );
        }
        OutputFormat::Text => {
            for diag in &diagnostics {
                println!("{}", format_diagnostic(file, diag));
            }
            if !quiet {
                let warnings = diagnostics.len() - errors;
                if diagnostics.is_empty() {
                    eprintln!("{}: no problems found", file.display());
                } else {
                    eprintln!("{}: {} error(s), {} warning(s)", file.display(), errors, warnings);
                }
            }
        }
    }

    if errors > 0 {
        process::exit(1);
    }
}
