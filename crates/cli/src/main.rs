//! # sheetsense-cli
//!
//! Command-line interface for inspecting the logical structure of workbooks.

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use sheetsense_core::{
    ClassifierConfig, FileInfo, InspectOptions, Inspector, Progress, ProgressInfo, RowSource,
    DEFAULT_MAX_ROWS,
};
use sheetsense_report::{render_json, render_markdown, summary_to_toon, CompactPayload};
use sheetsense_sheet::XlsxSource;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// sheetsense - infer sections, headers and column types of spreadsheets
#[derive(Parser, Debug)]
#[command(name = "sheetsense")]
#[command(author, version, about = "Spreadsheet structure inspector", long_about = None)]
struct Cli {
    /// Workbook to inspect (.xlsx)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// Only list sheets with their row and column counts
    #[arg(short, long)]
    summary: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Classifier configuration (JSON)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Rows read per sheet (at most 1000)
    #[arg(long, default_value_t = DEFAULT_MAX_ROWS)]
    max_rows: usize,

    /// Print progress to stderr
    #[arg(short, long)]
    progress: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// Markdown report (default)
    #[default]
    Markdown,
    /// Compact TOON payload with sampled values
    Toon,
    /// Compact TOON payload with every column value
    ToonFull,
    /// JSON
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .init();
    }

    let options = build_options(&cli)?;
    let source = XlsxSource::open(&cli.file)
        .with_context(|| format!("Failed to open workbook: {}", cli.file.display()))?;
    let mut inspector = Inspector::with_options(source, options);

    let info = if cli.summary {
        inspector.inspect()
    } else {
        inspector.inspect_with_details()
    }
    .with_context(|| format!("Failed to inspect {}", cli.file.display()))?;
    info!(sheets = info.sheets.len(), "inspection finished");

    let rendered = render(&mut inspector, &info, cli.format, !cli.summary)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            eprintln!("{} {}", "Wrote".green().bold(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Inspector options from the command line.
fn build_options(cli: &Cli) -> Result<InspectOptions> {
    if cli.max_rows == 0 || cli.max_rows > DEFAULT_MAX_ROWS {
        bail!("--max-rows must be between 1 and {DEFAULT_MAX_ROWS}");
    }
    let mut options = InspectOptions::default().with_max_rows(cli.max_rows);

    if let Some(path) = &cli.config {
        let config = ClassifierConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;
        options = options
            .with_classifier_config(&config)
            .context("Invalid classifier configuration")?;
    }
    if cli.progress {
        options = options.with_progress(Progress::new().with_callback(print_progress));
    }
    Ok(options)
}

fn print_progress(progress: &ProgressInfo) {
    let sheet = if progress.sheet.is_empty() {
        String::new()
    } else {
        format!(" {}", progress.sheet.bold())
    };
    eprintln!(
        "{}{} {}/{} ({:.0}%)",
        progress.phase.cyan(),
        sheet,
        progress.current,
        progress.total,
        progress.percent
    );
}

/// Render `info` in the requested format.
fn render<S: RowSource>(
    inspector: &mut Inspector<S>,
    info: &FileInfo,
    format: OutputFormat,
    detailed: bool,
) -> Result<String> {
    let rendered = match format {
        OutputFormat::Markdown => render_markdown(inspector, info, detailed)?,
        OutputFormat::Json => render_json(info)?,
        OutputFormat::Toon | OutputFormat::ToonFull if !detailed => summary_to_toon(info)?,
        OutputFormat::Toon => CompactPayload::sample(info).to_toon_string()?,
        OutputFormat::ToonFull => CompactPayload::full(info, inspector)?.to_toon_string()?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsense_core::MemorySource;
    use std::io::Write;

    fn stock() -> MemorySource {
        MemorySource::new().with_sheet(
            "Stock",
            vec![
                vec!["MERK", "TYPE", "YEAR"],
                vec!["Toyota", "Avanza", "2020"],
            ],
        )
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["sheetsense", "book.xlsx"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Markdown);
        assert_eq!(cli.max_rows, DEFAULT_MAX_ROWS);
        assert!(!cli.summary && !cli.progress && !cli.verbose);
    }

    #[test]
    fn test_parse_format_names() {
        let cli = Cli::try_parse_from(["sheetsense", "b.xlsx", "--format", "toon-full"]).unwrap();
        assert_eq!(cli.format, OutputFormat::ToonFull);
        assert!(Cli::try_parse_from(["sheetsense", "b.xlsx", "-f", "csv"]).is_err());
    }

    #[test]
    fn test_zero_max_rows_rejected() {
        let cli = Cli::try_parse_from(["sheetsense", "b.xlsx", "--max-rows", "0"]).unwrap();
        assert!(build_options(&cli).is_err());
    }

    #[test]
    fn test_max_rows_above_cap_rejected() {
        let cli = Cli::try_parse_from(["sheetsense", "b.xlsx", "--max-rows", "5000"]).unwrap();
        let err = build_options(&cli).unwrap_err();
        assert!(err.to_string().contains("between 1 and 1000"));

        let cli = Cli::try_parse_from(["sheetsense", "b.xlsx", "--max-rows", "1000"]).unwrap();
        assert_eq!(build_options(&cli).unwrap().max_rows, 1000);
    }

    #[test]
    fn test_config_file_is_applied() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "header_tokens": ["SKU", "QTY", "PRICE"], "report": null }}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::try_parse_from(["sheetsense", "b.xlsx", "--config", &path]).unwrap();
        let options = build_options(&cli).unwrap();
        assert_eq!(options.classifier.strategies().len(), 1);
        assert_eq!(options.classifier.strategies()[0].strategy.name(), "generic");
    }

    #[test]
    fn test_bad_config_reports_path() {
        let cli = Cli::try_parse_from(["sheetsense", "b.xlsx", "--config", "missing.json"]).unwrap();
        let err = build_options(&cli).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_summary_toon_ignores_details() {
        let mut inspector = Inspector::new(stock());
        let info = inspector.inspect().unwrap();
        let out = render(&mut inspector, &info, OutputFormat::ToonFull, false).unwrap();
        assert_eq!(out, "sheets[1]{name,row_count,column_count}:\n  Stock,2,3\n");
    }

    #[test]
    fn test_render_detailed_formats() {
        let mut inspector = Inspector::new(stock());
        let info = inspector.inspect_with_details().unwrap();

        let markdown = render(&mut inspector, &info, OutputFormat::Markdown, true).unwrap();
        assert!(markdown.contains("## Sheet Details"));

        let toon = render(&mut inspector, &info, OutputFormat::Toon, true).unwrap();
        assert!(toon.contains("  Stock,1,MERK,A1,string,Toyota\n"));

        let json = render(&mut inspector, &info, OutputFormat::Json, true).unwrap();
        assert!(json.contains("\"sheet_details\""));
    }
}
