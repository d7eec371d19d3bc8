//! Page-by-page, line-by-line transaction extraction.

use crate::models::config::ExtractionConfig;
use crate::models::transaction::{Transaction, TransactionDetails};

use super::report::{ExtractionEvent, ExtractionReporter, TracingReporter};
use super::rules::{AmountNormalizer, DetailAssociator, PatternCatalog, TransactionClassifier};
use super::source::{DocumentSource, StatementDocument};

/// Turns statement pages into transactions.
///
/// Each line is run through the [`PatternCatalog`]. A matching line becomes
/// a [`Transaction`], enriched once with detail fields from the lines below
/// it and stamped with its source file and page. Lines that match nothing
/// are dropped. Pages and documents never share state, so the output only
/// depends on the input.
pub struct ExtractionPipeline<R: ExtractionReporter = TracingReporter> {
    catalog: PatternCatalog,
    associator: DetailAssociator,
    classifier: TransactionClassifier,
    reporter: R,
}

impl ExtractionPipeline<TracingReporter> {
    /// Pipeline reporting through `tracing`.
    pub fn new() -> Self {
        Self::with_reporter(TracingReporter)
    }
}

impl Default for ExtractionPipeline<TracingReporter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ExtractionReporter> ExtractionPipeline<R> {
    /// Pipeline sending events to `reporter`.
    pub fn with_reporter(reporter: R) -> Self {
        Self {
            catalog: PatternCatalog::new(),
            associator: DetailAssociator::new(),
            classifier: TransactionClassifier::new(),
            reporter,
        }
    }

    /// Apply extraction settings.
    pub fn with_config(mut self, config: &ExtractionConfig) -> Self {
        self.associator = DetailAssociator::with_window(config.lookahead_lines);
        self
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Extract transactions from one page.
    ///
    /// `page` is 1-based.
    pub fn process_page<S: AsRef<str>>(
        &self,
        source_file: &str,
        page: u32,
        lines: &[S],
    ) -> Vec<Transaction> {
        let normalizer = AmountNormalizer::new(&self.reporter);
        let mut transactions = Vec::new();

        for (index, raw) in lines.iter().enumerate() {
            let line = raw.as_ref().trim();
            if line.is_empty() {
                continue;
            }

            let Some(matched) = self.catalog.match_line(line, &normalizer) else {
                continue;
            };
            self.reporter.report(ExtractionEvent::LineMatched {
                page,
                line: index,
                rule: matched.rule,
            });

            let candidate = matched.candidate;
            let category = candidate
                .category
                .unwrap_or_else(|| self.classifier.classify(&candidate.description));

            let mut details = TransactionDetails::default();
            for found in self.associator.scan(lines, index, &normalizer) {
                for field in details.merge(found.details) {
                    self.reporter.report(ExtractionEvent::DetailConflict {
                        transaction_id: candidate.transaction_id.clone(),
                        field,
                    });
                }
            }

            transactions.push(Transaction {
                date: candidate.date,
                transaction_id: candidate.transaction_id,
                category,
                description: candidate.description,
                amount: candidate.amount,
                balance: candidate.balance,
                details,
                source_file: source_file.to_string(),
                page,
                raw_line: line.to_string(),
                pattern_used: matched.rule,
            });
        }

        transactions
    }

    /// Extract transactions from every page of a document, in page order.
    pub fn process_document(&self, document: &StatementDocument) -> Vec<Transaction> {
        self.reporter.report(ExtractionEvent::DocumentStarted {
            source: document.source_file.clone(),
            pages: document.pages.len(),
        });

        let transactions: Vec<Transaction> = document
            .pages
            .iter()
            .zip(1u32..)
            .flat_map(|(lines, page)| {
                self.process_page(&document.source_file, page, lines.as_slice())
            })
            .collect();

        self.reporter.report(ExtractionEvent::DocumentFinished {
            source: document.source_file.clone(),
            transactions: transactions.len(),
        });
        transactions
    }

    /// Read and process one document. A read failure is reported and
    /// yields no transactions.
    pub fn process_source<D: DocumentSource + ?Sized>(&self, source: &D) -> Vec<Transaction> {
        match source.read() {
            Ok(document) => self.process_document(&document),
            Err(e) => {
                self.reporter.report(ExtractionEvent::DocumentFailed {
                    source: source.name(),
                    error: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Process documents in order, skipping the ones that cannot be read.
    pub fn process_sources<'s, D, I>(&self, sources: I) -> Vec<Transaction>
    where
        D: DocumentSource + ?Sized + 's,
        I: IntoIterator<Item = &'s D>,
    {
        sources
            .into_iter()
            .flat_map(|source| self.process_source(source))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, StatementError};
    use crate::models::transaction::{RuleId, TransactionCategory};
    use crate::statement::report::NullReporter;
    use crate::statement::source::MemorySource;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::cell::RefCell;

    const PAGE_ONE: &str = "\
Wyciąg z rachunku nr 1/2024
Saldo z przeniesienia 5 000,00
Okres: 01.02.2024 - 29.02.2024
Waluta: PLN
Data Nr transakcji Opis Kwota Saldo
01.02.2024 K1 ZAKUP PRZY UŻYCIU KARTY -43,10 4 956,90
01.02.2024 Karta:123456****7890 Lokalizacja: BIEDRONKA WARSZAWA Nr ref: 998877
Kwota oryg.: 43,10 PLN

  03.02.2024 T1 PRZELEW WYCHODZĄCY -1 200,00 3 756,90
12345678901234567890123456 JAN KOWALSKI Ref. wł. zlec.: 556677
Tytuł: CZYNSZ LUTY
Data księgowania: 03.02.2024
Kanał: bankowość internetowa
05.02.2024 W1 WYMIANA W KANTORZE - OBCIĄŻENIE -431,25 3 325,65
05.02.2024 KX77 EUR/PLN 4.3125 -431,25 PLN 100,00 EUR";

    const PAGE_TWO: &str = "\
Strona 2
07.02.2024 K2 PŁATNOŚĆ WEB -10,00 3 315,66
07.02.2024 Tel:48500100200 Godz.14:05:33 Lokalizacja: ALLEGRO.PL POZNAN Nr ref: 123
06.02.2024 OPL1 OPŁATA ZA PROWADZENIE RACHUNKU -9,99 3 305,67";

    fn statement(name: &str) -> StatementDocument {
        StatementDocument::from_text(name, &format!("{PAGE_ONE}\x0c\x0c{PAGE_TWO}"))
    }

    struct FailingSource;

    impl DocumentSource for FailingSource {
        fn name(&self) -> String {
            "broken.pdf".to_string()
        }

        fn read(&self) -> Result<StatementDocument> {
            Err(StatementError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "locked",
            )))
        }
    }

    #[test]
    fn test_document_end_to_end() {
        let pipeline = ExtractionPipeline::with_reporter(NullReporter);
        let transactions = pipeline.process_document(&statement("luty.pdf"));

        let summary: Vec<(RuleId, TransactionCategory, u32)> = transactions
            .iter()
            .map(|t| (t.pattern_used, t.category, t.page))
            .collect();
        assert_eq!(
            summary,
            vec![
                (RuleId::BalanceTransfer, TransactionCategory::BalanceCarryover, 1),
                (RuleId::CardTransaction, TransactionCategory::CardPurchase, 1),
                (RuleId::TransferTransaction, TransactionCategory::OutgoingTransfer, 1),
                (RuleId::CurrencyExchange, TransactionCategory::CurrencyExchange, 1),
                (RuleId::CardTransaction, TransactionCategory::WebPayment, 3),
                (RuleId::MainTransaction, TransactionCategory::Other, 3),
            ]
        );

        let carryover = &transactions[0];
        assert!(carryover.is_carryover());
        assert_eq!(carryover.date, None);
        assert_eq!(carryover.amount, Decimal::ZERO);
        assert_eq!(carryover.balance, Decimal::new(500000, 2));
        assert!(carryover.details.is_empty());

        let card = &transactions[1];
        assert_eq!(card.date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(card.source_file, "luty.pdf");
        assert_eq!(card.details.card_number.as_deref(), Some("123456****7890"));
        assert_eq!(card.details.location.as_deref(), Some("BIEDRONKA WARSZAWA"));
        assert_eq!(card.details.original_amount, Some(Decimal::new(4310, 2)));

        let transfer = &transactions[2];
        assert_eq!(transfer.raw_line, "03.02.2024 T1 PRZELEW WYCHODZĄCY -1 200,00 3 756,90");
        assert_eq!(transfer.amount, Decimal::new(-120000, 2));
        assert_eq!(transfer.details.recipient.as_deref(), Some("JAN KOWALSKI"));
        assert_eq!(transfer.details.exchange_rate, None);

        let exchange = &transactions[3];
        assert_eq!(exchange.details.exchange_rate, Some(Decimal::new(43125, 4)));
        assert_eq!(exchange.details.foreign_currency.as_deref(), Some("EUR"));

        let web = &transactions[4];
        assert_eq!(web.details.phone.as_deref(), Some("48500100200"));
        assert_eq!(web.details.time.as_deref(), Some("14:05:33"));

        let fee = &transactions[5];
        assert_eq!(fee.description, "OPŁATA ZA PROWADZENIE RACHUNKU");
        assert!(fee.details.is_empty());
    }

    #[test]
    fn test_outgoing_transfer_line() {
        let pipeline = ExtractionPipeline::with_reporter(NullReporter);
        let line = "01.02.2024 ABC123 PRZELEW WYCHODZĄCY -100,00 900,00";
        let transactions = pipeline.process_page("a.pdf", 1, &[line]);

        assert_eq!(transactions.len(), 1);
        let t = &transactions[0];
        assert_eq!(t.pattern_used, RuleId::TransferTransaction);
        assert_eq!(t.category, TransactionCategory::OutgoingTransfer);
        assert_eq!(t.amount, Decimal::new(-10000, 2));
        assert_eq!(t.balance, Decimal::new(90000, 2));
        assert_eq!(t.transaction_id, "ABC123");
    }

    #[test]
    fn test_lookahead_bound() {
        let pipeline = ExtractionPipeline::with_reporter(NullReporter);
        let detail = "Kwota oryg.: 43,10 PLN";
        let mut lines = vec!["01.02.2024 K1 ZAKUP PRZY UŻYCIU KARTY -43,10 956,90"];

        lines.extend(["x", "x", "x", detail]);
        let at_four = pipeline.process_page("a.pdf", 1, &lines);
        assert_eq!(at_four[0].details.original_amount, Some(Decimal::new(4310, 2)));

        lines.insert(1, "x");
        let at_five = pipeline.process_page("a.pdf", 1, &lines);
        assert_eq!(at_five[0].details.original_amount, None);

        let wider = ExtractionPipeline::with_reporter(NullReporter)
            .with_config(&ExtractionConfig { lookahead_lines: 5 });
        let widened = wider.process_page("a.pdf", 1, &lines);
        assert_eq!(widened[0].details.original_amount, Some(Decimal::new(4310, 2)));
    }

    #[test]
    fn test_detail_fields_are_written_once() {
        let events = RefCell::new(Vec::new());
        let reporter = |e: ExtractionEvent| {
            if matches!(e, ExtractionEvent::DetailConflict { .. }) {
                events.borrow_mut().push(e);
            }
        };
        let pipeline = ExtractionPipeline::with_reporter(reporter);

        let lines = [
            "07.02.2024 K2 PŁATNOŚĆ WEB -10,00 3 305,66",
            "07.02.2024 Tel:48500100200 Godz.14:05:33 Lokalizacja: ALLEGRO.PL POZNAN Nr ref: 123",
            "07.02.2024 Karta:123456****7890 Lokalizacja: ZABKA GDANSK Nr ref: 1",
        ];
        let transactions = pipeline.process_page("a.pdf", 1, &lines);

        let details = &transactions[0].details;
        assert_eq!(details.location.as_deref(), Some("ALLEGRO.PL POZNAN"));
        assert_eq!(details.card_number.as_deref(), Some("123456****7890"));
        assert_eq!(
            *events.borrow(),
            vec![ExtractionEvent::DetailConflict {
                transaction_id: "K2".to_string(),
                field: "location",
            }]
        );
    }

    #[test]
    fn test_bad_amount_does_not_stop_extraction() {
        let events = RefCell::new(Vec::new());
        let reporter = |e: ExtractionEvent| {
            if matches!(e, ExtractionEvent::UnparseableAmount { .. }) {
                events.borrow_mut().push(e);
            }
        };
        let pipeline = ExtractionPipeline::with_reporter(reporter);

        // too many digits for a decimal
        let huge = "999 999 999 999 999 999 999 999 999 999,00";
        let lines = [
            format!("01.02.2024 K1 ZAKUP PRZY UŻYCIU KARTY -43,10 {huge}"),
            "02.02.2024 K2 ZWROT BLIK 43,10 1 000,00".to_string(),
        ];
        let transactions = pipeline.process_page("a.pdf", 1, &lines);

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].amount, Decimal::new(-4310, 2));
        assert_eq!(transactions[0].balance, Decimal::ZERO);
        assert_eq!(transactions[1].category, TransactionCategory::BlikRefund);
        assert_eq!(
            *events.borrow(),
            vec![ExtractionEvent::UnparseableAmount {
                value: huge.to_string()
            }]
        );
    }

    #[test]
    fn test_empty_pages() {
        let pipeline = ExtractionPipeline::with_reporter(NullReporter);
        let document = StatementDocument::new("scan.pdf", vec![vec![], vec![]]);
        assert!(pipeline.process_document(&document).is_empty());

        let empty: [&str; 0] = [];
        assert!(pipeline.process_page("scan.pdf", 1, &empty).is_empty());
    }

    #[test]
    fn test_runs_are_identical() {
        let pipeline = ExtractionPipeline::with_reporter(NullReporter);
        let sources = vec![
            MemorySource::new(statement("a.pdf")),
            MemorySource::new(statement("b.pdf")),
        ];

        let first = pipeline.process_sources(&sources);
        let second = pipeline.process_sources(&sources);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.len(), 12);
        assert!(first[..6].iter().all(|t| t.source_file == "a.pdf"));
        assert!(first[6..].iter().all(|t| t.source_file == "b.pdf"));
    }

    #[test]
    fn test_failed_document_is_skipped() {
        let events = RefCell::new(Vec::new());
        let reporter = |e: ExtractionEvent| {
            if matches!(e, ExtractionEvent::DocumentFailed { .. }) {
                events.borrow_mut().push(e);
            }
        };
        let pipeline = ExtractionPipeline::with_reporter(reporter);

        let sources: Vec<Box<dyn DocumentSource>> = vec![
            Box::new(FailingSource),
            Box::new(MemorySource::new(statement("ok.pdf"))),
        ];
        let transactions = pipeline.process_sources(&sources);

        assert_eq!(transactions.len(), 6);
        assert!(transactions.iter().all(|t| t.source_file == "ok.pdf"));
        assert_eq!(
            *events.borrow(),
            vec![ExtractionEvent::DocumentFailed {
                source: "broken.pdf".to_string(),
                error: "I/O error: locked".to_string(),
            }]
        );
    }
}
