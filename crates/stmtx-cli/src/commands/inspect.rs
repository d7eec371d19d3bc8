//! Inspect command - show which rule each statement line matches.

use std::path::PathBuf;

use clap::Args;
use console::style;

use stmtx_core::source_for_path;
use stmtx_core::statement::PatternCatalog;

use super::load_config;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Statement file (PDF or text)
    input: PathBuf,

    /// Only print lines that matched a rule
    #[arg(short, long)]
    matched_only: bool,

    /// Print the extracted text as is
    #[arg(long)]
    raw: bool,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let document = source_for_path(&args.input, &config.pdf).read()?;
    let catalog = PatternCatalog::new();

    let mut total = 0;
    let mut matched = 0;
    for (page, lines) in (1..).zip(&document.pages) {
        println!("{}", style(format!("--- page {} ---", page)).bold());

        if args.raw {
            for line in lines {
                println!("{}", line);
            }
            continue;
        }

        for (index, line) in lines.iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            total += 1;

            match catalog.matching_rule(line) {
                Some(rule) => {
                    matched += 1;
                    let rule = style(format!("{:<22}", rule.as_str())).green();
                    println!("{:>4} {} {}", index, rule, line);
                }
                None if !args.matched_only => {
                    println!("{:>4} {} {}", index, style(format!("{:<22}", "-")).dim(), line);
                }
                None => {}
            }
        }
    }

    if !args.raw {
        println!();
        println!(
            "{} {} of {} lines matched a transaction rule",
            style("ℹ").blue(),
            matched,
            total
        );
    }

    Ok(())
}
