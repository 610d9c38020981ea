//! filequery - Report file metadata and text snippets for a directory.
//!
//! Usage:
//!   fquery INDIR [OUTDIR]            Report .txt files in INDIR
//!   fquery INDIR OUTDIR -r --all     Report every file, recursively
//!   fquery INDIR -f html             Write an HTML table instead of DAT
//!   fquery --help                    Show help

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use filequery_core::{OutputFormat, QueryConfig, QueryError, RecordSet, SnippetSizes, TextSuffix};
use filequery_report::{ReportSchema, report_file_name, write_report};
use filequery_scan::run_query_with_shell_tools;

#[derive(Parser)]
#[command(
    name = "filequery",
    version,
    about = "Report file metadata and text snippets for a directory",
    long_about = "filequery lists the files in a directory, asks `file` for their type and \
                  `wc` for line/word/char counts, reads a short snippet from each text file \
                  and writes everything to a CSV, DAT or HTML report."
)]
struct Cli {
    /// Directory to scan
    indir: PathBuf,

    /// Directory the report is written to
    #[arg(default_value = ".")]
    outdir: PathBuf,

    /// Report every file, not only text files
    #[arg(long)]
    all: bool,

    /// Descend into subdirectories (hidden ones are skipped)
    #[arg(short, long)]
    recursive: bool,

    /// Characters read into the text field
    #[arg(long, default_value = "20")]
    text_size: usize,

    /// Characters read into the list field (0 omits the column)
    #[arg(long, default_value = "0")]
    list_size: usize,

    /// Characters read into the memo field (0 omits the column)
    #[arg(long, default_value = "0")]
    memo_size: usize,

    /// Output format: csv, dat or html
    #[arg(short, long, default_value = "dat")]
    format: String,

    /// File name suffix that marks a file as text
    #[arg(long, default_value = ".txt")]
    suffix: String,

    /// Add a timestamp to the report file name
    #[arg(long)]
    timestamp: bool,

    /// Seconds to wait for each `file`/`wc` call (0 waits forever)
    #[arg(long, default_value = "30")]
    tool_timeout: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli)?;
    check_output_dir(&config.output_dir).context("Output directory is not usable")?;

    tracing::info!(
        root = %config.root.display(),
        format = %config.format,
        recursive = config.recursive,
        "scanning"
    );

    let records = run_query_with_shell_tools(&config).context("Query failed")?;
    if records.is_empty() {
        println!("no files");
        return Ok(());
    }

    let stamp = config
        .timestamped
        .then(|| chrono::Local::now().format("%Y%m%d-%H%M%S").to_string());
    let output = config
        .output_dir
        .join(report_file_name(config.format, stamp.as_deref()));

    let schema = ReportSchema::new(&config.snippet_sizes);
    let rows = write_report(&output, &records, config.format, &schema)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;

    print_summary(&output, &records, rows);
    Ok(())
}

/// Log to stderr, honouring `RUST_LOG` when it is set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn build_config(cli: &Cli) -> Result<QueryConfig> {
    let suffix = TextSuffix::new(&cli.suffix).context("Invalid --suffix")?;
    let tool_timeout = (cli.tool_timeout > 0).then(|| Duration::from_secs(cli.tool_timeout));

    let config = QueryConfig::builder()
        .root(cli.indir.clone())
        .output_dir(cli.outdir.clone())
        .recursive(cli.recursive)
        .include_all(cli.all)
        .text_suffix(suffix)
        .snippet_sizes(SnippetSizes {
            text: cli.text_size,
            list: cli.list_size,
            memo: cli.memo_size,
        })
        .format(OutputFormat::from_name(&cli.format))
        .timestamped(cli.timestamp)
        .tool_timeout(tool_timeout)
        .build()
        .context("Invalid configuration")?;
    Ok(config)
}

fn check_output_dir(dir: &Path) -> Result<(), QueryError> {
    let meta = std::fs::metadata(dir).map_err(|e| QueryError::output(dir, e))?;
    if !meta.is_dir() {
        return Err(QueryError::output(
            dir,
            io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }
    if meta.permissions().readonly() {
        return Err(QueryError::output(
            dir,
            io::Error::new(io::ErrorKind::PermissionDenied, "directory is read-only"),
        ));
    }
    Ok(())
}

fn print_summary(output: &Path, records: &RecordSet, rows: usize) {
    println!();
    println!("{}", "─".repeat(60));
    println!(" {}", output.display());
    println!(
        " {} files ({} with errors), {}",
        records.len(),
        records.failure_count(),
        format_size(records.total_size())
    );
    if rows < records.len() {
        println!(" {} of {} rows written", rows, records.len());
    }
    println!("{}", "─".repeat(60));
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["fquery", "/data"]).unwrap();
        let config = build_config(&cli).unwrap();

        assert_eq!(config.root, PathBuf::from("/data"));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.format, OutputFormat::Dat);
        assert_eq!(config.snippet_sizes, SnippetSizes::text_only(20));
        assert_eq!(config.tool_timeout, Some(Duration::from_secs(30)));
        assert!(!config.recursive);
        assert!(!config.include_all);
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from([
            "fquery", "/data", "/out", "-r", "--all", "-f", "HTML", "--list-size", "10",
            "--suffix", "LOG", "--tool-timeout", "0",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();

        assert_eq!(config.output_dir, PathBuf::from("/out"));
        assert_eq!(config.format, OutputFormat::Html);
        assert_eq!(config.snippet_sizes.list, 10);
        assert_eq!(config.text_suffix.as_str(), ".log");
        assert_eq!(config.tool_timeout, None);
        assert!(config.recursive && config.include_all);
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let cli = Cli::try_parse_from(["fquery", "/data", "-f", "xlsx"]).unwrap();
        assert_eq!(build_config(&cli).unwrap().format, OutputFormat::Dat);
    }

    #[test]
    fn test_output_dir_must_exist() {
        let err = check_output_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, QueryError::OutputUnwritable { .. }));
    }

    #[test]
    fn test_oversized_snippets_rejected() {
        let cli =
            Cli::try_parse_from(["fquery", "/data", "--text-size", "20000", "--memo-size", "1"])
                .unwrap();
        assert!(build_config(&cli).is_err());
    }
}
