//! Command-line argument parsing
//!
//! Supports:
//! - Opening a source document (markdown or plain text)
//! - Opening an existing generated code file straight into the preview
//! - Overriding the detected format

use std::path::PathBuf;

use clap::Parser;

use crate::model::Format;

/// Live document preview and editor
#[derive(Parser, Debug)]
#[command(name = "markweave", version, about = "Live document preview and editor")]
pub struct CliArgs {
    /// Source document or generated code file to open
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Treat the opened file as this format instead of detecting it
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Start with an empty session, ignoring PATH
    #[arg(short = 'n', long)]
    pub new: bool,
}

/// What the session starts with
#[derive(Debug, Clone)]
pub enum StartupMode {
    /// Empty session
    Empty,
    /// A source document to generate from
    Source { path: PathBuf },
    /// An already generated code file, previewed directly
    Code { path: PathBuf, format: Format },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub mode: StartupMode,
}

impl CliArgs {
    /// Convert parsed CLI args into startup configuration
    pub fn into_config(self) -> Result<StartupConfig, String> {
        if self.new {
            return Ok(StartupConfig {
                mode: StartupMode::Empty,
            });
        }
        let Some(path) = self.path else {
            return Ok(StartupConfig {
                mode: StartupMode::Empty,
            });
        };

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let mode = match self.format.or_else(|| Format::from_extension(&ext)) {
            Some(format) => StartupMode::Code { path, format },
            None if ext == "md" || ext == "markdown" || ext == "txt" || ext.is_empty() => {
                StartupMode::Source { path }
            }
            None => {
                return Err(format!(
                    "Unrecognized file type '.{}'; pass --format to override",
                    ext
                ))
            }
        };
        Ok(StartupConfig { mode })
    }
}
