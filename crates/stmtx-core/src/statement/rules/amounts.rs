//! Amount parsing for Polish-formatted statement numbers.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ExtractionError;
use crate::statement::report::{ExtractionEvent, ExtractionReporter};

/// Converts locale-formatted amounts, substituting zero for garbage.
///
/// Parse failures are reported and never abort extraction.
pub struct AmountNormalizer<'r> {
    reporter: &'r dyn ExtractionReporter,
}

impl<'r> AmountNormalizer<'r> {
    pub fn new(reporter: &'r dyn ExtractionReporter) -> Self {
        Self { reporter }
    }

    /// Parse `s`, or report it and return zero.
    pub fn normalize(&self, s: &str) -> Decimal {
        if s.trim().is_empty() {
            return Decimal::ZERO;
        }
        match parse_locale_amount(s) {
            Ok(amount) => amount,
            Err(_) => {
                self.reporter.report(ExtractionEvent::UnparseableAmount {
                    value: s.to_string(),
                });
                Decimal::ZERO
            }
        }
    }

    /// Parse a plain `123.4567` decimal (exchange rates), or report it and
    /// return zero.
    pub fn normalize_plain(&self, s: &str) -> Decimal {
        match Decimal::from_str(s.trim()) {
            Ok(value) => value,
            Err(_) => {
                self.reporter.report(ExtractionEvent::UnparseableAmount {
                    value: s.to_string(),
                });
                Decimal::ZERO
            }
        }
    }

    pub(crate) fn reporter(&self) -> &'r dyn ExtractionReporter {
        self.reporter
    }
}

/// Parse a Polish-formatted amount (e.g. "1 234,56" or "-12,00").
///
/// Spaces (including non-breaking ones) are dropped and the decimal comma
/// becomes a point.
pub fn parse_locale_amount(s: &str) -> Result<Decimal, ExtractionError> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{00a0}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let valid = !cleaned.is_empty()
        && cleaned
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || c == '.' || (c == '-' && i == 0));

    if !valid {
        return Err(ExtractionError::UnparseableAmount {
            value: s.to_string(),
        });
    }

    Decimal::from_str(&cleaned).map_err(|_| ExtractionError::UnparseableAmount {
        value: s.to_string(),
    })
}

/// Format amount in Polish style (1 234,56).
pub fn format_locale_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let (sign, s) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let Some((integer_part, decimal_part)) = s.split_once('.') else {
        return format!("{}{}", sign, s);
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(' ');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::report::NullReporter;
    use std::cell::RefCell;

    #[test]
    fn test_parse_locale_amount() {
        assert_eq!(
            parse_locale_amount("1 234,56"),
            Ok(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            parse_locale_amount("-12,00"),
            Ok(Decimal::from_str("-12.00").unwrap())
        );
        assert_eq!(
            parse_locale_amount("12 345 678,90"),
            Ok(Decimal::from_str("12345678.90").unwrap())
        );
        assert_eq!(parse_locale_amount("0,05"), Ok(Decimal::new(5, 2)));
        assert_eq!(
            parse_locale_amount("1\u{00a0}000,00"),
            Ok(Decimal::new(100000, 2))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["garbage", "", "1,2,3", "12-00", "1_000,00", "+5,00"] {
            assert!(
                matches!(
                    parse_locale_amount(input),
                    Err(ExtractionError::UnparseableAmount { .. })
                ),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_amounts_are_exact() {
        let total: Decimal = ["0,10", "0,20"]
            .iter()
            .map(|s| parse_locale_amount(s).unwrap())
            .sum();
        assert_eq!(total, Decimal::new(30, 2));
    }

    #[test]
    fn test_normalize_substitutes_zero() {
        let seen = RefCell::new(Vec::new());
        let reporter = |event: ExtractionEvent| seen.borrow_mut().push(event);
        let normalizer = AmountNormalizer::new(&reporter);

        assert_eq!(normalizer.normalize("1 234,56"), Decimal::new(123456, 2));
        assert_eq!(normalizer.normalize("garbage"), Decimal::ZERO);
        assert_eq!(normalizer.normalize(""), Decimal::ZERO);

        assert_eq!(
            *seen.borrow(),
            vec![ExtractionEvent::UnparseableAmount {
                value: "garbage".to_string()
            }]
        );
    }

    #[test]
    fn test_normalize_plain() {
        let normalizer = AmountNormalizer::new(&NullReporter);
        assert_eq!(normalizer.normalize_plain("4.3125"), Decimal::new(43125, 4));
        assert_eq!(normalizer.normalize_plain("x"), Decimal::ZERO);
    }

    #[test]
    fn test_format_locale_amount() {
        assert_eq!(format_locale_amount(Decimal::new(123456, 2)), "1 234,56");
        assert_eq!(format_locale_amount(Decimal::new(1234567890, 2)), "12 345 678,90");
        assert_eq!(format_locale_amount(Decimal::new(-500000, 2)), "-5 000,00");
        assert_eq!(format_locale_amount(Decimal::new(7, 1)), "0,70");
    }
}
