//! `quill render` command implementation.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_renderer::{HtmlBackend, MarkdownRenderer, RenderEnv, RenderResult};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render. Relative paths are also looked up in the
    /// book's source directory.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover book.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory that include paths are relative to (default: the file's
    /// directory).
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chapter source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Hidden-line prefix for a language, as LANG=PREFIX (overrides config).
    #[arg(long = "hidelines", value_name = "LANG=PREFIX", value_parser = parse_hidelines)]
    hidelines: Vec<(String, String)>,

    /// Enable verbose output (show include resolution logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            hidelines: self.hidelines.iter().cloned().collect(),
        };
        let config = load_config(self.config.as_deref(), &self.file, &cli_settings)?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let file = locate(&self.file, &config.source_dir)?;
        let cwd = std::path::absolute(self.cwd.as_deref().unwrap_or(&file))?;
        tracing::info!(file = %file.display(), cwd = %cwd.display(), "Rendering");

        let result = render_file(&file, &cwd, &config)?;
        for warning in &result.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        match &self.output {
            Some(path) => {
                fs::write(path, &result.html)?;
                output.success(&format!("Rendered {} to {}", file.display(), path.display()));
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(result.html.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

/// Render one Markdown file with the book extensions enabled.
fn render_file(file: &Path, cwd: &Path, config: &Config) -> Result<RenderResult, CliError> {
    let markdown = fs::read_to_string(file)?;
    let renderer =
        MarkdownRenderer::<HtmlBackend>::new().with_book_extensions(config.hidelines().clone());
    Ok(renderer.render(&markdown, &RenderEnv::with_cwd(cwd)))
}

/// Load the explicit config, or the one discovered from the file's directory.
fn load_config(
    config: Option<&Path>,
    file: &Path,
    cli_settings: &CliSettings,
) -> Result<Config, CliError> {
    let config = match config {
        Some(path) => Config::load(Some(path), Some(cli_settings))?,
        None => Config::load_from_dir(&std::path::absolute(start_dir(file))?, Some(cli_settings))?,
    };
    Ok(config)
}

/// Directory to start config discovery from.
fn start_dir(file: &Path) -> &Path {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Find the Markdown file, falling back to the source directory.
fn locate(file: &Path, source_dir: &Path) -> Result<PathBuf, CliError> {
    if file.is_file() {
        return Ok(file.to_path_buf());
    }
    if file.is_relative() {
        let candidate = source_dir.join(file);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(CliError::Validation(format!(
        "Markdown file not found: {}",
        file.display()
    )))
}

/// Parse a `LANG=PREFIX` pair.
fn parse_hidelines(value: &str) -> Result<(String, String), String> {
    let (lang, prefix) = value
        .split_once('=')
        .ok_or_else(|| format!("expected LANG=PREFIX, got `{value}`"))?;
    if lang.trim().is_empty() {
        return Err(format!("missing language in `{value}`"));
    }
    Ok((lang.trim().to_owned(), prefix.to_owned()))
}
