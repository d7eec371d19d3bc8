//! Association of detail lines with the transaction row above them.

use regex::{Captures, Regex};

use super::amounts::AmountNormalizer;
use super::patterns::{
    CARD_DETAILS, CURRENCY_DETAILS, ORIGINAL_AMOUNT, TRANSFER_DETAILS, WEB_PAYMENT_DETAILS,
};
use crate::models::transaction::TransactionDetails;

/// Number of lines after a transaction row searched for details.
pub const LOOKAHEAD_WINDOW: usize = 4;

/// The lines following a transaction row, at most `size` of them.
///
/// Offsets are 1-based relative to the row.
#[derive(Debug, Clone, Copy)]
pub struct LookaheadWindow<'a, S> {
    lines: &'a [S],
}

impl<'a, S: AsRef<str>> LookaheadWindow<'a, S> {
    /// Window after `lines[index]`, clipped to the end of the page.
    pub fn after(lines: &'a [S], index: usize, size: usize) -> Self {
        let start = (index + 1).min(lines.len());
        let end = index.saturating_add(size).saturating_add(1).min(lines.len());
        Self {
            lines: &lines[start..end],
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `(offset, trimmed line)` pairs, nearest first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a str)> + use<'a, S> {
        let lines = self.lines;
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| (i + 1, line.as_ref().trim()))
    }
}

/// Which detail pattern produced a set of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKind {
    Card,
    WebPayment,
    OriginalAmount,
    CurrencyExchange,
    Transfer,
}

type DetailExtractor = fn(&Captures<'_>, &AmountNormalizer<'_>) -> TransactionDetails;

struct DetailPattern {
    kind: DetailKind,
    pattern: &'static Regex,
    extract: DetailExtractor,
}

/// Fields contributed by one detail line.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailMatch {
    pub kind: DetailKind,
    /// 1-based distance from the transaction row.
    pub offset: usize,
    pub details: TransactionDetails,
}

/// Scans a bounded window below a transaction row for detail lines.
pub struct DetailAssociator {
    window: usize,
    patterns: Vec<DetailPattern>,
}

impl DetailAssociator {
    pub fn new() -> Self {
        Self::with_window(LOOKAHEAD_WINDOW)
    }

    /// Associator searching `window` lines below each row.
    pub fn with_window(window: usize) -> Self {
        Self {
            window,
            patterns: vec![
                DetailPattern {
                    kind: DetailKind::Card,
                    pattern: &CARD_DETAILS,
                    extract: extract_card,
                },
                DetailPattern {
                    kind: DetailKind::WebPayment,
                    pattern: &WEB_PAYMENT_DETAILS,
                    extract: extract_web_payment,
                },
                DetailPattern {
                    kind: DetailKind::OriginalAmount,
                    pattern: &ORIGINAL_AMOUNT,
                    extract: extract_original_amount,
                },
                DetailPattern {
                    kind: DetailKind::CurrencyExchange,
                    pattern: &CURRENCY_DETAILS,
                    extract: extract_currency,
                },
                DetailPattern {
                    kind: DetailKind::Transfer,
                    pattern: &TRANSFER_DETAILS,
                    extract: extract_transfer,
                },
            ],
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Detail matches below `lines[index]`, nearest first.
    ///
    /// Each line contributes at most one match; lines matching nothing are
    /// skipped.
    pub fn scan<S: AsRef<str>>(
        &self,
        lines: &[S],
        index: usize,
        normalizer: &AmountNormalizer<'_>,
    ) -> Vec<DetailMatch> {
        LookaheadWindow::after(lines, index, self.window)
            .iter()
            .filter_map(|(offset, line)| {
                self.patterns.iter().find_map(|p| {
                    p.pattern.captures(line).map(|caps| DetailMatch {
                        kind: p.kind,
                        offset,
                        details: (p.extract)(&caps, normalizer),
                    })
                })
            })
            .collect()
    }
}

impl Default for DetailAssociator {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_card(caps: &Captures<'_>, _: &AmountNormalizer<'_>) -> TransactionDetails {
    TransactionDetails {
        card_number: Some(caps[2].to_string()),
        location: Some(caps[3].to_string()),
        ..Default::default()
    }
}

fn extract_web_payment(caps: &Captures<'_>, _: &AmountNormalizer<'_>) -> TransactionDetails {
    TransactionDetails {
        phone: Some(caps[2].to_string()),
        time: Some(caps[3].to_string()),
        location: Some(caps[4].to_string()),
        ..Default::default()
    }
}

fn extract_original_amount(
    caps: &Captures<'_>,
    normalizer: &AmountNormalizer<'_>,
) -> TransactionDetails {
    TransactionDetails {
        original_amount: Some(normalizer.normalize(&caps[1])),
        ..Default::default()
    }
}

fn extract_currency(caps: &Captures<'_>, normalizer: &AmountNormalizer<'_>) -> TransactionDetails {
    TransactionDetails {
        currency_pair: Some(caps[3].to_string()),
        exchange_rate: Some(normalizer.normalize_plain(&caps[4])),
        pln_amount: Some(normalizer.normalize(&caps[5])),
        foreign_amount: Some(normalizer.normalize(&caps[6])),
        foreign_currency: Some(caps[7].to_string()),
        ..Default::default()
    }
}

fn extract_transfer(caps: &Captures<'_>, _: &AmountNormalizer<'_>) -> TransactionDetails {
    TransactionDetails {
        account_number: Some(caps[1].to_string()),
        recipient: Some(caps[2].to_string()),
        reference: Some(caps[3].to_string()),
        ..Default::default()
    }
}
