//! Reporting of recoverable conditions met during extraction.
//!
//! The pipeline never logs on its own. It hands every noteworthy condition
//! to an [`ExtractionReporter`] supplied by the caller.

use tracing::{debug, info, warn};

use crate::models::transaction::RuleId;

/// Something the pipeline wants the caller to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionEvent {
    /// An amount substring could not be parsed; zero was used instead.
    UnparseableAmount { value: String },

    /// A date substring is not a calendar date; the record has no date.
    InvalidDate { value: String },

    /// A detail line tried to set a field that an earlier line already set.
    DetailConflict {
        transaction_id: String,
        field: &'static str,
    },

    /// A line produced a transaction.
    LineMatched { page: u32, line: usize, rule: RuleId },

    /// A document is about to be processed.
    DocumentStarted { source: String, pages: usize },

    /// A document was processed.
    DocumentFinished { source: String, transactions: usize },

    /// A document could not be read and was skipped.
    DocumentFailed { source: String, error: String },
}

/// Receiver for [`ExtractionEvent`]s.
pub trait ExtractionReporter {
    fn report(&self, event: ExtractionEvent);
}

impl<F> ExtractionReporter for F
where
    F: Fn(ExtractionEvent),
{
    fn report(&self, event: ExtractionEvent) {
        self(event)
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ExtractionReporter for TracingReporter {
    fn report(&self, event: ExtractionEvent) {
        match event {
            ExtractionEvent::UnparseableAmount { value } => {
                warn!("Could not parse amount: {}", value);
            }
            ExtractionEvent::InvalidDate { value } => {
                warn!("Invalid date: {}", value);
            }
            ExtractionEvent::DetailConflict { transaction_id, field } => {
                debug!("Ignoring second value for {} on transaction {}", field, transaction_id);
            }
            ExtractionEvent::LineMatched { page, line, rule } => {
                debug!("Page {} line {} matched {}", page, line + 1, rule);
            }
            ExtractionEvent::DocumentStarted { source, pages } => {
                info!("Processing {} - {} pages", source, pages);
            }
            ExtractionEvent::DocumentFinished { source, transactions } => {
                info!("Extracted {} transactions from {}", transactions, source);
            }
            ExtractionEvent::DocumentFailed { source, error } => {
                tracing::error!("Error processing {}: {}", source, error);
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ExtractionReporter for NullReporter {
    fn report(&self, _event: ExtractionEvent) {}
}
