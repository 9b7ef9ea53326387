//! CLI argument definitions for the invoice header mapper.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use invoice_map::{FilterMode, SortMode};
use invoice_model::{FieldCategory, InvoiceDirection};

#[derive(Parser)]
#[command(
    name = "invoice-mapper",
    version,
    about = "Map spreadsheet column headers to e-invoice fields",
    long_about = "Map the column headers of an uploaded spreadsheet to the fields of the\n\
                  electronic invoice schema.\n\n\
                  Suggests matches, records corrections and skips, and reports which\n\
                  required invoice fields are still missing."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the invoice fields headers can be mapped to.
    Fields(FieldsArgs),

    /// Show the suggested field for every header of a CSV file.
    Suggest(SuggestArgs),

    /// Edit, review and save the header mapping for a CSV file.
    Map(MapArgs),
}

#[derive(Args)]
pub struct FieldsArgs {
    /// Only list fields of this section.
    #[arg(long = "category", value_enum)]
    pub category: Option<CategoryArg>,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// CSV file whose first non-empty row holds the headers.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct MapArgs {
    /// CSV file whose first non-empty row holds the headers.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory holding saved mappings.
    #[arg(long = "store", value_name = "DIR", default_value = ".invoice-mapper")]
    pub store: PathBuf,

    /// Which upload flow the mapping belongs to.
    #[arg(long = "direction", value_enum, default_value = "sent")]
    pub direction: DirectionArg,

    /// Map a header to a field id (repeatable).
    #[arg(long = "set", value_name = "HEADER=FIELD", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Mark a header as intentionally unmapped (repeatable).
    #[arg(long = "skip", value_name = "HEADER")]
    pub skip: Vec<String>,

    /// Forget the decision for a header (repeatable).
    #[arg(long = "clear", value_name = "HEADER")]
    pub clear: Vec<String>,

    /// Accept the suggestion of every header without a decision.
    #[arg(long = "accept-suggestions")]
    pub accept_suggestions: bool,

    /// Move a field to this header even if another header holds it.
    ///
    /// Without this flag, `--set` on a field that is already mapped is
    /// rejected.
    #[arg(long = "force")]
    pub force: bool,

    /// Which headers to list.
    #[arg(long = "filter", value_enum, default_value = "all")]
    pub filter: FilterArg,

    /// How to order the listed headers.
    #[arg(long = "sort", value_enum, default_value = "original")]
    pub sort: SortArg,

    /// Only list headers containing this text.
    #[arg(long = "search", value_name = "TEXT", default_value = "")]
    pub search: String,

    /// Require every required field to be mapped before saving.
    ///
    /// Exits with status 1 and lists the missing fields otherwise.
    #[arg(long = "finalize")]
    pub finalize: bool,

    /// Apply edits and print the result without saving.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Parse a `HEADER=FIELD` pair. The header may itself contain `=`; the
/// last one separates it from the field id.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (header, field) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected HEADER=FIELD, got '{raw}'"))?;
    let (header, field) = (header.trim(), field.trim());
    if header.is_empty() || field.is_empty() {
        return Err(format!("expected HEADER=FIELD, got '{raw}'"));
    }
    Ok((header.to_string(), field.to_string()))
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    Sent,
    Received,
}

impl From<DirectionArg> for InvoiceDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Sent => InvoiceDirection::Sent,
            DirectionArg::Received => InvoiceDirection::Received,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FilterArg {
    All,
    Mapped,
    Unmapped,
    Required,
}

impl From<FilterArg> for FilterMode {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => FilterMode::All,
            FilterArg::Mapped => FilterMode::Mapped,
            FilterArg::Unmapped => FilterMode::Unmapped,
            FilterArg::Required => FilterMode::Required,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    Original,
    Alphabetical,
    MappedFirst,
    UnmappedFirst,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Original => SortMode::Original,
            SortArg::Alphabetical => SortMode::Alphabetical,
            SortArg::MappedFirst => SortMode::MappedFirst,
            SortArg::UnmappedFirst => SortMode::UnmappedFirst,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Invoice,
    Supplier,
    Customer,
    Totals,
    Tax,
    Payment,
    Line,
}

impl From<CategoryArg> for FieldCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Invoice => FieldCategory::Invoice,
            CategoryArg::Supplier => FieldCategory::Supplier,
            CategoryArg::Customer => FieldCategory::Customer,
            CategoryArg::Totals => FieldCategory::Totals,
            CategoryArg::Tax => FieldCategory::Tax,
            CategoryArg::Payment => FieldCategory::Payment,
            CategoryArg::Line => FieldCategory::Line,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_assignment_splits_on_last_equals() {
        assert_eq!(
            parse_assignment("Invoice No = invoice_number"),
            Ok(("Invoice No".to_string(), "invoice_number".to_string()))
        );
        assert_eq!(
            parse_assignment("a=b=issue_date"),
            Ok(("a=b".to_string(), "issue_date".to_string()))
        );
    }

    #[test]
    fn parse_assignment_rejects_missing_parts() {
        assert!(parse_assignment("Invoice No").is_err());
        assert!(parse_assignment("=invoice_number").is_err());
        assert!(parse_assignment("Invoice No=").is_err());
    }

    #[test]
    fn map_arguments_parse() {
        let cli = Cli::try_parse_from([
            "invoice-mapper",
            "map",
            "headers.csv",
            "--set",
            "Invoice No=invoice_number",
            "--skip",
            "Internal",
            "--sort",
            "mapped-first",
            "--direction",
            "received",
        ])
        .unwrap();
        let Command::Map(args) = cli.command else {
            panic!("expected map command");
        };
        assert_eq!(args.set, vec![("Invoice No".into(), "invoice_number".into())]);
        assert_eq!(args.skip, vec!["Internal".to_string()]);
        assert!(matches!(args.sort, SortArg::MappedFirst));
        assert_eq!(InvoiceDirection::from(args.direction), InvoiceDirection::Received);
    }
}
