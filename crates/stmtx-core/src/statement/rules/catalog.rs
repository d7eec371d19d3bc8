//! Ordered cascade of line-level transaction rules.

use chrono::NaiveDate;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use super::amounts::AmountNormalizer;
use super::patterns::{
    BALANCE_TRANSFER, CARD_TRANSACTION, CURRENCY_EXCHANGE, MAIN_TRANSACTION, TRANSFER_TRANSACTION,
};
use crate::models::transaction::{
    RuleId, TransactionCategory, CARRYOVER_DESCRIPTION, CARRYOVER_TRANSACTION_ID,
};
use crate::statement::report::{ExtractionEvent, ExtractionReporter};

/// Date format used on statement lines.
pub const STATEMENT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Partial record produced by a matching rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub date: Option<NaiveDate>,
    pub transaction_id: String,
    pub description: String,
    /// Set by rules whose category does not come from the description.
    pub category: Option<TransactionCategory>,
    pub amount: Decimal,
    pub balance: Decimal,
}

/// The rule that matched a line and what it extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub rule: RuleId,
    pub candidate: Candidate,
}

type Extractor = fn(&Captures<'_>, &AmountNormalizer<'_>) -> Candidate;

/// A line predicate paired with the extractor for its captures.
pub struct PatternRule {
    id: RuleId,
    pattern: &'static Regex,
    extract: Extractor,
}

impl PatternRule {
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// Whether the whole line has this rule's shape.
    pub fn is_match(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    /// Extract a candidate if the line matches.
    pub fn apply(&self, line: &str, normalizer: &AmountNormalizer<'_>) -> Option<Candidate> {
        self.pattern
            .captures(line)
            .map(|caps| (self.extract)(&caps, normalizer))
    }
}

impl std::fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRule")
            .field("id", &self.id)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Transaction rules in priority order; the first match wins.
///
/// The specific literal families come before the generic row so that
/// `pattern_used` records the family, and the carryover rule comes last.
#[derive(Debug)]
pub struct PatternCatalog {
    rules: Vec<PatternRule>,
}

impl PatternCatalog {
    pub fn new() -> Self {
        Self {
            rules: vec![
                PatternRule {
                    id: RuleId::CardTransaction,
                    pattern: &CARD_TRANSACTION,
                    extract: extract_row,
                },
                PatternRule {
                    id: RuleId::TransferTransaction,
                    pattern: &TRANSFER_TRANSACTION,
                    extract: extract_row,
                },
                PatternRule {
                    id: RuleId::CurrencyExchange,
                    pattern: &CURRENCY_EXCHANGE,
                    extract: extract_row,
                },
                PatternRule {
                    id: RuleId::MainTransaction,
                    pattern: &MAIN_TRANSACTION,
                    extract: extract_row,
                },
                PatternRule {
                    id: RuleId::BalanceTransfer,
                    pattern: &BALANCE_TRANSFER,
                    extract: extract_carryover,
                },
            ],
        }
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// First rule whose pattern matches `line`, without extracting.
    pub fn matching_rule(&self, line: &str) -> Option<RuleId> {
        self.rules.iter().find(|r| r.is_match(line)).map(|r| r.id)
    }

    /// Run the cascade over one trimmed line.
    pub fn match_line(&self, line: &str, normalizer: &AmountNormalizer<'_>) -> Option<RuleMatch> {
        self.rules.iter().find_map(|rule| {
            rule.apply(line, normalizer).map(|candidate| RuleMatch {
                rule: rule.id,
                candidate,
            })
        })
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a `DD.MM.YYYY` date, reporting values that are not calendar dates.
pub fn parse_statement_date(s: &str, reporter: &dyn ExtractionReporter) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(s, STATEMENT_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            reporter.report(ExtractionEvent::InvalidDate {
                value: s.to_string(),
            });
            None
        }
    }
}

fn extract_row(caps: &Captures<'_>, normalizer: &AmountNormalizer<'_>) -> Candidate {
    Candidate {
        date: parse_statement_date(&caps[1], normalizer.reporter()),
        transaction_id: caps[2].to_string(),
        description: caps[3].to_string(),
        category: None,
        amount: normalizer.normalize(&caps[4]),
        balance: normalizer.normalize(&caps[5]),
    }
}

fn extract_carryover(caps: &Captures<'_>, normalizer: &AmountNormalizer<'_>) -> Candidate {
    Candidate {
        date: None,
        transaction_id: CARRYOVER_TRANSACTION_ID.to_string(),
        description: CARRYOVER_DESCRIPTION.to_string(),
        category: Some(TransactionCategory::BalanceCarryover),
        amount: Decimal::ZERO,
        balance: normalizer.normalize(&caps[1]),
    }
}
