//! Statement documents and where they come from.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::models::config::PdfConfig;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Page separator in plain-text statements.
pub const PAGE_BREAK: char = '\x0c';

/// A statement as ordered pages of ordered text lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementDocument {
    /// File name recorded on every transaction.
    pub source_file: String,
    /// Pages in order; a page without text is an empty vector.
    pub pages: Vec<Vec<String>>,
}

impl StatementDocument {
    pub fn new(source_file: impl Into<String>, pages: Vec<Vec<String>>) -> Self {
        Self {
            source_file: source_file.into(),
            pages,
        }
    }

    /// Split plain text into pages at form feeds and pages into lines.
    pub fn from_text(source_file: impl Into<String>, text: &str) -> Self {
        let mut pages: Vec<Vec<String>> = text
            .split(PAGE_BREAK)
            .map(|page| page.lines().map(str::to_string).collect())
            .collect();

        // A trailing form feed does not start another page.
        let trailing_blank = pages
            .last()
            .is_some_and(|page| page.iter().all(|l| l.trim().is_empty()));
        if pages.len() > 1 && trailing_blank {
            pages.pop();
        }

        Self::new(source_file, pages)
    }

    /// Keep at most `max_pages` pages (0 keeps all).
    pub fn truncate_pages(&mut self, max_pages: usize) {
        if max_pages > 0 {
            self.pages.truncate(max_pages);
        }
    }
}

/// Something that can produce a [`StatementDocument`].
pub trait DocumentSource {
    /// Name used in reports before the document is read.
    fn name(&self) -> String;

    /// Read the document. Errors are recoverable per document.
    fn read(&self) -> Result<StatementDocument>;
}

impl<D: DocumentSource + ?Sized> DocumentSource for Box<D> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn read(&self) -> Result<StatementDocument> {
        (**self).read()
    }
}

/// An already-loaded document.
#[derive(Debug, Clone)]
pub struct MemorySource {
    document: StatementDocument,
}

impl MemorySource {
    pub fn new(document: StatementDocument) -> Self {
        Self { document }
    }
}

impl DocumentSource for MemorySource {
    fn name(&self) -> String {
        self.document.source_file.clone()
    }

    fn read(&self) -> Result<StatementDocument> {
        Ok(self.document.clone())
    }
}

/// A statement already converted to UTF-8 text, pages split by form feed.
#[derive(Debug, Clone)]
pub struct TextFileSource {
    path: PathBuf,
    max_pages: usize,
}

impl TextFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_pages: 0,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }
}

impl DocumentSource for TextFileSource {
    fn name(&self) -> String {
        file_name(&self.path)
    }

    fn read(&self) -> Result<StatementDocument> {
        let text = fs::read_to_string(&self.path)?;
        let mut document = StatementDocument::from_text(self.name(), &text);
        document.truncate_pages(self.max_pages);
        Ok(document)
    }
}

/// A PDF statement on disk.
#[derive(Debug, Clone)]
pub struct PdfFileSource {
    path: PathBuf,
    config: PdfConfig,
}

impl PdfFileSource {
    pub fn new(path: impl Into<PathBuf>, config: PdfConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }
}

impl DocumentSource for PdfFileSource {
    fn name(&self) -> String {
        file_name(&self.path)
    }

    fn read(&self) -> Result<StatementDocument> {
        let data = fs::read(&self.path)?;
        let mut extractor = PdfExtractor::new().with_empty_password(self.config.try_empty_password);
        extractor.load(&data)?;

        let pages = extractor.extract_pages()?;
        debug!("{}: extracted text from {} pages", self.path.display(), pages.len());

        let mut document =
            StatementDocument::new(self.name(), pages.iter().map(|p| p.lines()).collect());
        document.truncate_pages(self.config.max_pages);
        Ok(document)
    }
}

/// Pick a source by file extension: `.txt` is plain text, anything else PDF.
pub fn source_for_path(path: &Path, config: &PdfConfig) -> Box<dyn DocumentSource + Send> {
    let is_text = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));

    if is_text {
        Box::new(TextFileSource::new(path).with_max_pages(config.max_pages))
    } else {
        Box::new(PdfFileSource::new(path, config.clone()))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
