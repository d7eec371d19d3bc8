//! Core library for Polish bank statement processing.
//!
//! This crate provides:
//! - PDF text extraction, page by page
//! - Rule-based recognition of transaction rows and their detail lines
//! - Locale-aware amount and date parsing
//! - Transaction models and summaries ready for CSV or JSON export

pub mod error;
pub mod models;
pub mod pdf;
pub mod statement;

pub use error::{ExtractionError, PdfError, Result, StatementError};
pub use models::config::StmtxConfig;
pub use models::summary::StatementSummary;
pub use models::transaction::{RuleId, Transaction, TransactionCategory, TransactionDetails};
pub use pdf::{PdfExtractor, PdfPage, PdfProcessor};
pub use statement::{
    source_for_path, DocumentSource, ExtractionEvent, ExtractionPipeline, ExtractionReporter,
    MemorySource, NullReporter, PdfFileSource, StatementDocument, TextFileSource, TracingReporter,
};
