//! quill CLI - Markdown renderer with mdBook-style directives.
//!
//! Provides commands for:
//! - `render`: Render one Markdown file to HTML

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::RenderArgs;
use output::Output;

/// quill - Markdown renderer with mdBook-style directives.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown file to HTML.
    Render(RenderArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);
    let filter = if verbose {
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
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
