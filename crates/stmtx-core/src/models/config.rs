//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, StatementError};
use crate::statement::LOOKAHEAD_WINDOW;

/// Main configuration for stmtx.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StmtxConfig {
    /// Where statements are picked up from.
    pub input: InputConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Line extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output file configuration.
    pub output: OutputConfig,
}

/// Input discovery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory scanned when no input is given on the command line.
    pub directory: PathBuf,

    /// File extensions accepted when scanning a directory.
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("assets/filesToProcess"),
            extensions: vec!["pdf".to_string(), "txt".to_string()],
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to process per document (0 = unlimited).
    pub max_pages: usize,

    /// Try an empty password on encrypted documents.
    pub try_empty_password: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            try_empty_password: true,
        }
    }
}

/// Line extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of lines after a transaction searched for detail fields.
    pub lookahead_lines: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            lookahead_lines: LOOKAHEAD_WINDOW,
        }
    }
}

/// Output file configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory output files are written to.
    pub directory: PathBuf,

    /// Output file name prefix; an epoch timestamp is appended.
    pub file_prefix: String,

    /// CSV field delimiter.
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("assets"),
            file_prefix: "transactions".to_string(),
            delimiter: ';',
        }
    }
}

impl StmtxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| StatementError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| StatementError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that serde cannot rule out.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.lookahead_lines == 0 {
            return Err(StatementError::Config(
                "extraction.lookahead_lines must be at least 1".to_string(),
            ));
        }
        if !self.output.delimiter.is_ascii() {
            return Err(StatementError::Config(format!(
                "output.delimiter must be an ASCII character, got {:?}",
                self.output.delimiter
            )));
        }
        Ok(())
    }
}
