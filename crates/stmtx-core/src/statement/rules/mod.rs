//! Rule-based line classification for Polish bank statements.

pub mod amounts;
pub mod catalog;
pub mod classify;
pub mod details;
pub mod patterns;

pub use amounts::{format_locale_amount, parse_locale_amount, AmountNormalizer};
pub use catalog::{parse_statement_date, Candidate, PatternCatalog, PatternRule, RuleMatch};
pub use classify::TransactionClassifier;
pub use details::{DetailAssociator, DetailKind, DetailMatch, LookaheadWindow, LOOKAHEAD_WINDOW};
