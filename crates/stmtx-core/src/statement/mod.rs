//! Transaction extraction from Polish bank statements.

pub mod pipeline;
pub mod report;
pub mod rules;
pub mod source;

pub use pipeline::ExtractionPipeline;
pub use report::{ExtractionEvent, ExtractionReporter, NullReporter, TracingReporter};
pub use rules::{
    format_locale_amount, parse_locale_amount, AmountNormalizer, DetailAssociator, DetailKind,
    DetailMatch, PatternCatalog, PatternRule, RuleMatch, TransactionClassifier, LOOKAHEAD_WINDOW,
};
pub use source::{
    source_for_path, DocumentSource, MemorySource, PdfFileSource, StatementDocument,
    TextFileSource,
};
