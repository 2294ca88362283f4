//! mdlive - Markdown live-preview server.
//!
//! Renders a Markdown file to HTML through the GitHub Markdown API, serves
//! the result over HTTP, and reloads connected browsers whenever the file
//! changes.

mod output;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use mdlive_server::{ServerConfig, run_server};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serve a Markdown file as live-reloading HTML.
#[derive(Parser)]
#[command(name = "mdlive", version, about)]
struct Cli {
    /// Port to listen on.
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Host to bind to.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Disable live reload (serve the rendered document only).
    #[arg(long)]
    no_live_reload: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Markdown file to serve (exactly one).
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Anything other than exactly one file is a usage error, reported
    // before any file or network access happens.
    let Some(source) = single_source(cli.files) else {
        let _ = Cli::command().print_help();
        return;
    };

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        source_path: source,
        live_reload_enabled: !cli.no_live_reload,
        version: VERSION.to_string(),
        ..ServerConfig::default()
    };

    output.info(&format!(
        "Serving {} at http://{}:{}",
        config.source_path.display(),
        config.host,
        config.port
    ));
    if config.live_reload_enabled {
        output.info("Live reload: enabled");
    } else {
        output.info("Live reload: disabled");
    }

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    if let Err(err) = rt.block_on(run_server(config)) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// Extract the single source file, if exactly one was given.
fn single_source(mut files: Vec<PathBuf>) -> Option<PathBuf> {
    if files.len() == 1 { files.pop() } else { None }
}
