//! Mapping of transaction descriptions to categories.

use crate::models::transaction::TransactionCategory;

/// Substring keys checked in order against the lowercased description.
///
/// Longer keys must come before any key they contain.
const CATEGORY_KEYS: &[(&str, TransactionCategory)] = &[
    ("zakup przy użyciu karty", TransactionCategory::CardPurchase),
    ("płatność web", TransactionCategory::WebPayment),
    ("zwrot blik", TransactionCategory::BlikRefund),
    ("przelew wychodzący", TransactionCategory::OutgoingTransfer),
    ("przelew przychodzący", TransactionCategory::IncomingTransfer),
    ("wymiana w kantorze", TransactionCategory::CurrencyExchange),
];

/// Classifies descriptions by ordered substring lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionClassifier;

impl TransactionClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Category for `description`, `Other` when no key is found.
    pub fn classify(&self, description: &str) -> TransactionCategory {
        let lower = description.to_lowercase();
        CATEGORY_KEYS
            .iter()
            .find(|(key, _)| lower.contains(key))
            .map(|(_, category)| *category)
            .unwrap_or(TransactionCategory::Other)
    }
}
