//! CLI argument definitions for tickvault.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `get` | Serve daily history for one symbol, from cache when fresh |
//! | `list` | List cached symbols with their metadata |
//! | `health` | Report status and the cache directory |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--data-dir` | `$TICKVAULT_HOME/data` | Directory holding cached entries |
//! | `--api-key` | env | Alpha Vantage API key |
//! | `--ttl-hours` | `24` | Freshness window |
//! | `--timeout-ms` | `15000` | Provider request timeout |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--log-level` | `RUST_LOG` or `info` | Log filter directive (logs go to stderr) |
//!
//! # Examples
//!
//! ```bash
//! tickvault get VOO --start-date 2024-01-02 --end-date 2024-01-31 --pretty
//! tickvault get spy --force-refresh
//! tickvault list
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Cached daily price history from Alpha Vantage.
#[derive(Debug, Parser)]
#[command(
    name = "tickvault",
    author,
    version,
    about = "Cached daily price history from Alpha Vantage"
)]
pub struct Cli {
    /// Directory holding one JSON entry per symbol.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Alpha Vantage API key (overrides TICKVAULT_ALPHAVANTAGE_API_KEY).
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Hours a cached entry stays fresh.
    #[arg(long, global = true)]
    pub ttl_hours: Option<String>,

    /// Provider request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log filter directive, e.g. `debug` or `tickvault_core=debug`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve daily OHLCV history for a symbol.
    Get(GetArgs),
    /// List cached symbols.
    List,
    /// Report service status.
    Health,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Ticker symbol (case-insensitive).
    pub symbol: String,

    /// First date to include (YYYY-MM-DD or RFC 3339).
    #[arg(long)]
    pub start_date: Option<String>,

    /// Last date to include (YYYY-MM-DD or RFC 3339).
    #[arg(long)]
    pub end_date: Option<String>,

    /// Skip the cache and fetch from the provider.
    #[arg(long, default_value_t = false)]
    pub force_refresh: bool,
}
