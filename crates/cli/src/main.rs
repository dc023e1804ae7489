mod commands;
mod settings;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// ICS assignment document compiler.
#[derive(Parser)]
#[command(name = "ics", version, about = "ICS assignment document compiler")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to an ics.toml (default: ./ics.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a document, stopping at the first error, and verify its code
    Compile {
        /// Path to the .ics source file
        file: PathBuf,
        /// Directory holding assignment<N>.json specs
        #[arg(long)]
        spec_dir: Option<PathBuf>,
        /// Skip running the OCaml verifier
        #[arg(long)]
        no_verify: bool,
        /// Seconds allowed per verifier run
        #[arg(long)]
        verifier_timeout: Option<u64>,
    },

    /// Report every problem in a document
    Lint {
        /// Path to the .ics source file
        file: PathBuf,
        /// Directory holding assignment<N>.json specs
        #[arg(long)]
        spec_dir: Option<PathBuf>,
    },

    /// Print the tag vocabulary
    Vocab,

    /// Start the Language Server Protocol server over stdio
    Lsp,
}

/// Log filter from `ICS_LOG`, then `RUST_LOG`, else `warn`. Logs go to
/// stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ICS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Compile {
            file,
            spec_dir,
            no_verify,
            verifier_timeout,
        } => {
            let overrides = settings::Overrides {
                spec_dir,
                no_verify,
                verifier_timeout,
            };
            let settings = load_settings(cli.config, overrides, cli.output, cli.quiet);
            commands::compile::cmd_compile(&file, &settings, cli.output, cli.quiet);
        }
        Commands::Lint { file, spec_dir } => {
            let overrides = settings::Overrides {
                spec_dir,
                ..Default::default()
            };
            let settings = load_settings(cli.config, overrides, cli.output, cli.quiet);
            commands::lint::cmd_lint(&file, &settings, cli.output, cli.quiet);
        }
        Commands::Vocab => {
            commands::vocab::cmd_vocab(cli.output);
        }
        Commands::Lsp => {
            if let Err(e) = ics_lsp::run() {
                eprintln!("LSP server error: {}", e);
                process::exit(1);
            }
        }
    }
}

fn load_settings(
    config: Option<PathBuf>,
    overrides: settings::Overrides,
    output: OutputFormat,
    quiet: bool,
) -> settings::Settings {
    match settings::Settings::load(config.as_deref(), overrides) {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
