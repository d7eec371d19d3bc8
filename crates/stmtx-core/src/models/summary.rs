//! Aggregate statistics over extracted transactions.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::transaction::{Transaction, TransactionCategory};

/// Summary of an extraction run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementSummary {
    /// Number of records, carryovers included.
    pub total_transactions: usize,

    /// Sum of all signed amounts.
    pub total_amount: Decimal,

    /// Earliest and latest dated record.
    pub date_range: Option<(NaiveDate, NaiveDate)>,

    /// Record count per category, most frequent first.
    pub categories: Vec<(TransactionCategory, usize)>,

    /// Number of distinct source files with at least one record.
    pub files_processed: usize,
}

impl StatementSummary {
    /// Build a summary. Returns `None` for an empty slice.
    pub fn from_transactions(transactions: &[Transaction]) -> Option<Self> {
        if transactions.is_empty() {
            return None;
        }

        let total_amount: Decimal = transactions.iter().map(|t| t.amount).sum();

        let mut dates = transactions.iter().filter_map(|t| t.date);
        let date_range = dates.next().map(|first| {
            dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)))
        });

        let mut counts: HashMap<TransactionCategory, usize> = HashMap::new();
        for t in transactions {
            *counts.entry(t.category).or_default() += 1;
        }
        let mut categories: Vec<_> = counts.into_iter().collect();
        categories.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let files_processed = transactions
            .iter()
            .map(|t| t.source_file.as_str())
            .collect::<HashSet<_>>()
            .len();

        Some(Self {
            total_transactions: transactions.len(),
            total_amount,
            date_range,
            categories,
            files_processed,
        })
    }
}
