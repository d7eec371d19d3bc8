//! Extract command - pull transactions out of one or more statements.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use stmtx_core::models::config::{ExtractionConfig, PdfConfig};
use stmtx_core::statement::format_locale_amount;
use stmtx_core::{
    source_for_path, ExtractionEvent, ExtractionPipeline, ExtractionReporter, StatementSummary,
    Transaction, TransactionDetails, TracingReporter,
};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Directory or glob pattern (default: input directory from config)
    input: Option<String>,

    /// Output file (default: <output-dir>/transactions_<timestamp>.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Number of documents processed in parallel
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Do not print the summary
    #[arg(long)]
    no_summary: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Delimited text, one row per transaction
    Csv,
    /// JSON array of transactions
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    transactions: Vec<Transaction>,
    error: Option<String>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.input.directory.display().to_string());
    let files = discover_files(&input, &config.input.extensions)?;

    if files.is_empty() {
        println!("{} No statement files found in {}", style("ℹ").blue(), input);
        return Ok(());
    }

    println!("{} Found {} files to process", style("ℹ").blue(), files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Documents run on the blocking pool; results are collected in input order.
    let jobs = args.jobs.max(1);
    let mut results = Vec::with_capacity(files.len());
    for chunk in files.chunks(jobs) {
        let handles: Vec<_> = chunk
            .iter()
            .cloned()
            .map(|path| {
                let pdf = config.pdf.clone();
                let extraction = config.extraction.clone();
                let task_path = path.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    extract_file(task_path, &pdf, &extraction)
                });
                (path, handle)
            })
            .collect();

        for (path, handle) in handles {
            let result = handle.await.unwrap_or_else(|e| {
                warn!("Worker for {} failed: {}", path.display(), e);
                FileResult {
                    path,
                    transactions: Vec::new(),
                    error: Some(format!("worker failed: {}", e)),
                }
            });
            results.push(result);
            pb.inc(1);
        }
    }
    pb.finish_and_clear();

    let failed: Vec<&FileResult> = results.iter().filter(|r| r.error.is_some()).collect();
    let transactions: Vec<Transaction> = results
        .iter()
        .flat_map(|r| r.transactions.iter().cloned())
        .collect();

    if !failed.is_empty() {
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if transactions.is_empty() {
        println!("{} No transactions found", style("ℹ").blue());
        return Ok(());
    }

    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => {
            let dir = args.output_dir.as_ref().unwrap_or(&config.output.directory);
            dir.join(format!(
                "{}_{}.{}",
                config.output.file_prefix,
                chrono::Utc::now().timestamp(),
                args.format.extension()
            ))
        }
    };
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match args.format {
        OutputFormat::Csv => {
            let file = fs::File::create(&output_path)?;
            write_csv(file, &transactions, config.output.delimiter as u8)?;
        }
        OutputFormat::Json => {
            fs::write(&output_path, serde_json::to_string_pretty(&transactions)?)?;
        }
    }
    debug!("Wrote output to {}", output_path.display());

    println!(
        "{} Saved {} transactions to {}",
        style("✓").green(),
        transactions.len(),
        output_path.display()
    );

    if !args.no_summary {
        if let Some(summary) = StatementSummary::from_transactions(&transactions) {
            print_summary(&summary);
        }
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    Ok(())
}

/// Statement files for `input`: the matching files of a directory, or the
/// matches of a glob pattern. Sorted by path.
fn discover_files(input: &str, extensions: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let input_path = Path::new(input);

    let mut files: Vec<PathBuf> = if input_path.is_dir() {
        fs::read_dir(input_path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect()
    } else {
        glob(input)?.filter_map(|r| r.ok()).collect()
    };

    files.retain(|p| has_extension(p, extensions));
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}

fn extract_file(path: PathBuf, pdf: &PdfConfig, extraction: &ExtractionConfig) -> FileResult {
    let source = source_for_path(&path, pdf);

    // Log everything as usual and keep the read error for the report.
    let error = RefCell::new(None);
    let reporter = |event: ExtractionEvent| {
        if let ExtractionEvent::DocumentFailed { error: message, .. } = &event {
            *error.borrow_mut() = Some(message.clone());
        }
        TracingReporter.report(event);
    };
    let pipeline = ExtractionPipeline::with_reporter(reporter).with_config(extraction);

    let transactions = pipeline.process_source(&source);
    FileResult {
        path,
        transactions,
        error: error.take(),
    }
}

/// Columns for a CSV export. Detail columns only appear when at least one
/// transaction carries that field.
fn csv_columns(transactions: &[Transaction]) -> Vec<&'static str> {
    let mut columns = vec![
        "date",
        "transaction_id",
        "type",
        "description",
        "amount",
        "balance",
        "source_file",
        "page",
    ];
    columns.extend(
        TransactionDetails::FIELD_NAMES
            .iter()
            .copied()
            .filter(|field| transactions.iter().any(|t| t.details.get(field).is_some())),
    );
    columns.extend(["raw_line", "pattern_used"]);
    columns
}

fn csv_value(transaction: &Transaction, column: &str) -> String {
    match column {
        "date" => transaction
            .date
            .map(|d| d.format("%d.%m.%Y").to_string())
            .unwrap_or_default(),
        "transaction_id" => transaction.transaction_id.clone(),
        "type" => transaction.category.label().to_string(),
        "description" => transaction.description.clone(),
        "amount" => transaction.amount.to_string(),
        "balance" => transaction.balance.to_string(),
        "source_file" => transaction.source_file.clone(),
        "page" => transaction.page.to_string(),
        "raw_line" => transaction.raw_line.clone(),
        "pattern_used" => transaction.pattern_used.to_string(),
        field => transaction.details.get(field).unwrap_or_default(),
    }
}

fn write_csv<W: io::Write>(
    writer: W,
    transactions: &[Transaction],
    delimiter: u8,
) -> anyhow::Result<()> {
    let columns = csv_columns(transactions);
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    wtr.write_record(&columns)?;
    for transaction in transactions {
        wtr.write_record(columns.iter().map(|c| csv_value(transaction, c)))?;
    }

    wtr.flush()?;
    Ok(())
}

fn print_summary(summary: &StatementSummary) {
    println!();
    println!("{}", style("Summary").bold());
    println!("  Transactions:    {}", summary.total_transactions);
    println!(
        "  Total amount:    {} PLN",
        format_locale_amount(summary.total_amount)
    );
    match summary.date_range {
        Some((from, to)) => println!(
            "  Date range:      {} - {}",
            from.format("%d.%m.%Y"),
            to.format("%d.%m.%Y")
        ),
        None => println!("  Date range:      n/a"),
    }
    println!("  Files processed: {}", summary.files_processed);
    println!("  By type:");
    for (category, count) in &summary.categories {
        println!("    {:<24} {}", category.label(), count);
    }
}
