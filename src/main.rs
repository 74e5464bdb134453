//! # xlsx2md
//!
//! Command-line interface for converting workbook sheets to Markdown tables.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use xlsx2md::{ConverterBuilder, DateFormat, FormulaMode, Locale, MessageCode};

/// xlsx2md - Convert xls/xlsx sheets to Markdown tables
#[derive(Parser)]
#[command(name = "xlsx2md")]
#[command(author, version, about = "Convert xls/xlsx sheets to Markdown tables", long_about = None)]
struct Cli {
    /// Workbooks to convert
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Sheet selector for the input at the same position; repeat once per input
    /// ("all" or comma-separated indices, default: all)
    #[arg(short = 's', long = "sheet", value_name = "SELECTOR", action = clap::ArgAction::Append)]
    sheets: Vec<String>,

    /// Pad cells so that columns line up
    #[arg(short = 'a', long = "align")]
    align: bool,

    /// Output formulas instead of their cached results
    #[arg(short = 'f', long = "formula")]
    formula: bool,

    /// chrono format string for date cells (default: ISO 8601)
    #[arg(long = "date-format", value_name = "FMT")]
    date_format: Option<String>,

    /// Directory to write Markdown files into
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Message language (en, zh)
    #[arg(short = 'l', long = "lang", default_value = "en", value_parser = parse_locale)]
    lang: Locale,

    /// Print the report as JSON
    #[arg(long = "json")]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_locale(tag: &str) -> Result<Locale, String> {
    Locale::from_tag(tag).ok_or_else(|| format!("unsupported language '{tag}' (expected en or zh)"))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let jobs = pair_jobs(&cli.inputs, &cli.sheets).unwrap_or_else(|| {
        Cli::command()
            .error(
                ErrorKind::WrongNumberOfValues,
                format!(
                    "{} ({} inputs, {} selectors)",
                    cli.lang.text(MessageCode::ArgumentMismatch),
                    cli.inputs.len(),
                    cli.sheets.len()
                ),
            )
            .exit()
    });

    let mut builder = ConverterBuilder::new().with_align_columns(cli.align);
    if cli.formula {
        builder = builder.with_formula_mode(FormulaMode::Formula);
    }
    if let Some(format) = cli.date_format {
        builder = builder.with_date_format(DateFormat::Custom(format));
    }
    if let Some(dir) = cli.output_dir {
        builder = builder.with_output_dir(dir);
    }
    let converter = builder
        .build()
        .map_err(|e| anyhow::anyhow!("{}: {e}", cli.lang.text(MessageCode::InvalidConfig)))?;

    let report = converter.convert_batch(&jobs);

    if cli.json {
        let json = serde_json::to_string_pretty(&report.to_json())
            .context("Failed to serialize report")?;
        println!("{json}");
    } else {
        for line in report.describe(cli.lang) {
            println!("{line}");
        }
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Pair each input with its selector. `None` when the counts differ.
fn pair_jobs(inputs: &[PathBuf], sheets: &[String]) -> Option<Vec<(PathBuf, String)>> {
    if sheets.is_empty() {
        return Some(
            inputs
                .iter()
                .map(|input| (input.clone(), "all".to_string()))
                .collect(),
        );
    }
    if sheets.len() != inputs.len() {
        return None;
    }
    Some(inputs.iter().cloned().zip(sheets.iter().cloned()).collect())
}
