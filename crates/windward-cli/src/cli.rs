//! CLI argument definitions for windward.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `resolve` | Resolve raw names to canonical symbols |
//! | `turnover` | Reconcile turnover values for symbols |
//! | `streak` | Current wind-label streak from stored history |
//! | `cycles` | Cycle segmentation and bucket returns |
//! | `monthly` | Monthly selection statistics |
//! | `gauge` | Map a bias/streak pair onto the gauge dial |
//! | `import` | Upsert records from a JSON file into the store |
//! | `show` | Print stored records, newest first |
//! | `clear` | Delete every stored record |
//! | `sources` | List data source capabilities and health |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--store` | `windward_records.json` | Path of the record store |
//! | `--config` | none | Optional JSON config file |
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--source` | `yahoo` | Market-data provider |
//! | `--offline` | `false` | Deterministic synthetic data, no network |
//!
//! # Examples
//!
//! ```bash
//! # Resolve aliases and decorated names
//! windward resolve 台積 "欣興電子(CB)"
//!
//! # Reconcile turnover with a manual override
//! windward turnover 台積電 聯發科 --date 2024-01-05 --set 台積電=150
//!
//! # Cycle performance at 2x leverage
//! windward cycles --leverage 2 --format table
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Market-wind dashboard engine for Taiwan equities.
///
/// Resolves symbols, reconciles turnover from tiered market-data
/// sources, and computes regime streaks, cycle returns, monthly
/// statistics and gauge scores over a local record store.
#[derive(Debug, Parser)]
#[command(
    name = "windward",
    author,
    version,
    about = "Symbol resolution and market-data reconciliation engine"
)]
pub struct Cli {
    /// Path of the JSON record store.
    #[arg(long, global = true, default_value = "windward_records.json")]
    pub store: PathBuf,

    /// Optional JSON config file overriding built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Market-data provider for turnover reconciliation.
    #[arg(long, global = true, value_enum, default_value_t = SourceSelector::Yahoo)]
    pub source: SourceSelector,

    /// Serve deterministic synthetic data instead of calling providers.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// ASCII table format for terminal display.
    Table,
}

/// Market-data provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Yahoo Finance chart endpoint (history + latest).
    Yahoo,
    /// TWSE real-time quote endpoint (latest only).
    Twse,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve raw names to canonical symbols.
    ///
    /// Applies decoration stripping, alias mapping, code lookup and
    /// sector overrides.
    ///
    /// # Examples
    ///
    ///   windward resolve 台積
    ///   windward resolve "欣興電子(CB)" 2330 --format table
    Resolve(ResolveArgs),

    /// Reconcile one turnover value per symbol.
    ///
    /// Values come from manual overrides, a batched history window, or
    /// per-symbol live quotes, in that order of precedence. Symbols
    /// with no trustworthy value are omitted.
    ///
    /// # Examples
    ///
    ///   windward turnover 台積電 聯發科
    ///   windward turnover 台積電 --date 2024-01-05 --set 台積電=150
    Turnover(TurnoverArgs),

    /// Current wind-label streak over the stored history.
    ///
    /// # Examples
    ///
    ///   windward streak
    ///   windward streak --as-of 2024-03-15
    Streak(StreakArgs),

    /// Segment stored history into cycles and report bucket returns.
    ///
    /// # Examples
    ///
    ///   windward cycles
    ///   windward cycles --leverage 2 --format table
    Cycles(CyclesArgs),

    /// Monthly per-symbol selection counts by strategy.
    ///
    /// # Examples
    ///
    ///   windward monthly
    ///   windward monthly --month 2024-03 --top 10
    Monthly(MonthlyArgs),

    /// Map a bias value and streak length onto the 0..=100 dial.
    ///
    /// With no --streak, the streak is taken from stored history.
    ///
    /// # Examples
    ///
    ///   windward gauge --bias 1.2
    ///   windward gauge --bias -0.8 --streak 4
    Gauge(GaugeArgs),

    /// Upsert records from a JSON file into the store.
    ///
    /// The file must hold a JSON array of daily records; records whose
    /// date already exists are replaced.
    Import(ImportArgs),

    /// Print stored records, newest first.
    Show(ShowArgs),

    /// Delete every stored record. Requires --yes.
    Clear(ClearArgs),

    /// List data source capabilities and health.
    Sources(SourcesArgs),
}

/// Arguments for the `resolve` command.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// One or more raw names, aliases or numeric codes.
    #[arg(required = true, num_args = 1..)]
    pub names: Vec<String>,
}

/// Arguments for the `turnover` command.
#[derive(Debug, Args)]
pub struct TurnoverArgs {
    /// One or more raw names, aliases or numeric codes.
    #[arg(required = true, num_args = 1..)]
    pub names: Vec<String>,

    /// Target trade date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Manual override as NAME=VALUE; repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,
}

/// Arguments for the `streak` command.
#[derive(Debug, Args)]
pub struct StreakArgs {
    /// Only consider records at or before this date (YYYY-MM-DD).
    #[arg(long)]
    pub as_of: Option<String>,
}

/// Arguments for the `cycles` command.
#[derive(Debug, Args)]
pub struct CyclesArgs {
    /// Leverage multiplier applied to segment returns.
    #[arg(long, default_value_t = 1.0)]
    pub leverage: f64,
}

/// Arguments for the `monthly` command.
#[derive(Debug, Args)]
pub struct MonthlyArgs {
    /// Restrict output to one month (YYYY-MM).
    #[arg(long)]
    pub month: Option<String>,

    /// Keep only the top N rows per month and strategy.
    #[arg(long)]
    pub top: Option<usize>,
}

/// Arguments for the `gauge` command.
#[derive(Debug, Args)]
pub struct GaugeArgs {
    /// Market bias value driving the band selection.
    #[arg(long, allow_hyphen_values = true)]
    pub bias: f64,

    /// Streak length; defaults to the stored history's current streak.
    #[arg(long)]
    pub streak: Option<u32>,
}

/// Arguments for the `import` command.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON file holding an array of daily records.
    pub file: PathBuf,
}

/// Arguments for the `show` command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Show only the record for this date (YYYY-MM-DD).
    #[arg(long)]
    pub date: Option<String>,

    /// Maximum number of records to print.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

/// Arguments for the `clear` command.
#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Confirm deletion of all stored records.
    #[arg(long, default_value_t = false)]
    pub yes: bool,
}

/// Arguments for the `sources` command.
#[derive(Debug, Args)]
pub struct SourcesArgs {}
