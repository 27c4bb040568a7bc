//! namu CLI - NamuMark renderer and blame tool.
//!
//! Provides commands for:
//! - `render`: Render a markup file to HTML
//! - `blame`: Attribute the lines of a file across its revisions
//! - `check-expr`: Validate a script snippet against the safe subset

mod commands;
mod error;
mod host;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BlameArgs, CheckExprArgs, RenderArgs};
use output::Output;

/// namu - NamuMark renderer.
#[derive(Parser)]
#[command(name = "namu", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markup file to HTML.
    Render(RenderArgs),
    /// Attribute every line of the last file to the revision that introduced it.
    Blame(BlameArgs),
    /// Check that a script snippet stays within the safe subset.
    CheckExpr(CheckExprArgs),
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
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Blame(args) => args.execute(),
        Commands::CheckExpr(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
