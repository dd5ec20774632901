//! Command-line front end of apibuilder.
//!
//! `generate` resolves the configured source (a document URL, a swagger UI,
//! an API-management project or a local file), runs the generator and
//! writes the TypeScript output. `render` does the same for a local file
//! without any network access.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod cli;
pub mod discovery;
pub mod fetch;
pub mod filter;
pub mod writer;

/// Environment variable holding the log level or filter spec.
pub const LOG_ENV: &str = "APIBUILDER_LOG";

/// Crates whose events a plain `APIBUILDER_LOG` level applies to.
const LOG_TARGETS: &[&str] = &["apibuilder_cli", "apibuilder_core", "apibuilder_common"];

#[derive(Parser)]
#[command(
    name = "apibuilder",
    version,
    about = "Generate TypeScript request functions and DTOs from Swagger / OpenAPI documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the configured document and generate into the output directories
    Generate(cli::generate::GenerateArgs),
    /// Generate from a local document file
    Render(cli::render::RenderArgs),
}

/// Run the CLI with the given arguments (program name first) and return
/// the process exit code.
pub fn run_cli(args: Vec<String>) -> i32 {
    init_tracing();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to create tokio runtime: {err}");
            return 1;
        }
    };

    runtime.block_on(run_cli_async(args))
}

async fn run_cli_async(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => cli::generate::run(args).await,
            Some(Commands::Render(args)) => cli::render::run(args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

fn init_tracing() {
    // APIBUILDER_LOG is a level ("debug") or a full filter spec
    // ("apibuilder_core=trace,reqwest=debug")
    let filter = log_filter(std::env::var(LOG_ENV).ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn log_filter(value: Option<&str>) -> String {
    let level = match value {
        Some(level) if is_plain_level(level) => level.to_ascii_lowercase(),
        Some(spec) if !spec.trim().is_empty() => return spec.to_string(),
        _ => "info".to_string(),
    };
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
