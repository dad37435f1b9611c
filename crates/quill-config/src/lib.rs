//! Book configuration for quill.
//!
//! Parses mdBook-style `book.toml` files with serde and provides
//! auto-discovery of the config file in parent directories.
//!
//! Only the settings that affect rendering are read:
//!
//! ```toml
//! [book]
//! title = "My Book"
//! src = "src"
//!
//! [output.html.code.hidelines]
//! python = "~"
//! ```
//!
//! Other sections (`[rust]`, `[build]`, `[preprocessor]`, ...) are accepted
//! and ignored. CLI settings can be applied during load via [`CliSettings`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "book.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-empty values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the chapter source directory.
    pub source_dir: Option<PathBuf>,
    /// Extra hidden-line prefixes by language, applied over the file's.
    pub hidelines: HashMap<String, String>,
}

/// Book configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[book]` metadata.
    pub book: BookConfig,
    /// `[output]` renderer settings.
    pub output: OutputConfig,

    /// Resolved chapter source directory (set after loading).
    #[serde(skip)]
    pub source_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// `[book]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Book title.
    pub title: Option<String>,
    /// Book authors.
    pub authors: Vec<String>,
    /// Short description.
    pub description: Option<String>,
    /// Book language (e.g., `en`).
    pub language: Option<String>,
    /// Chapter source directory, relative to the config file.
    pub src: String,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            title: None,
            authors: Vec::new(),
            description: None,
            language: None,
            src: "src".to_owned(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `[output.html]` settings.
    pub html: HtmlConfig,
}

/// `[output.html]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// `[output.html.code]` settings.
    pub code: CodeConfig,
}

/// `[output.html.code]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    /// Hidden-line prefix by language.
    pub hidelines: HashMap<String, String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, behaves like [`load_from_dir`](Self::load_from_dir) starting
    /// at the current directory.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let Some(path) = config_path else {
            let cwd = std::env::current_dir().unwrap_or_default();
            return Self::load_from_dir(&cwd, cli_settings);
        };
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::load_from_file(path)?.with_cli_settings(cli_settings)
    }

    /// Load the `book.toml` discovered from `start`, or defaults based at
    /// `start` when there is none.
    ///
    /// Only `start` and its parents are searched.
    ///
    /// # Errors
    ///
    /// Returns error if the discovered file cannot be read or parsed, or the
    /// result is invalid.
    pub fn load_from_dir(
        start: &Path,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let config = match Self::discover(start) {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default_with_base(start),
        };
        config.with_cli_settings(cli_settings)
    }

    /// Search for `book.toml` in `start` and its parents.
    #[must_use]
    pub fn discover(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Hidden-line prefixes by language.
    #[must_use]
    pub fn hidelines(&self) -> &HashMap<String, String> {
        &self.output.html.code.hidelines
    }

    /// Apply CLI settings, if any, and re-validate.
    fn with_cli_settings(mut self, cli_settings: Option<&CliSettings>) -> Result<Self, ConfigError> {
        if let Some(settings) = cli_settings {
            self.apply_cli_settings(settings);
            self.validate()?;
        }
        Ok(self)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.source_dir.clone_from(source_dir);
        }
        self.output.html.code.hidelines.extend(
            settings
                .hidelines
                .iter()
                .map(|(lang, prefix)| (lang.clone(), prefix.clone())),
        );
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let book = BookConfig::default();
        Self {
            source_dir: base.join(&book.src),
            book,
            output: OutputConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.source_dir = config_dir.join(&config.book.src);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.book.src, "book.src")?;

        for (lang, prefix) in self.hidelines() {
            require_non_empty(lang, "output.html.code.hidelines key")?;
            require_non_empty(prefix, &format!("output.html.code.hidelines.{lang}"))?;
        }

        Ok(())
    }
}
