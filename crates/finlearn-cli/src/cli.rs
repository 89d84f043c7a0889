//! CLI argument definitions for finlearn.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `overview` | One month of SPY closes as JSON |
//! | `chart` | Candlestick charts for one or more tickers |
//! | `news` | Recent headlines for a search query |
//! | `chat` | Interactive chat with a hosted language model |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--secrets` | `$FINLEARN_SECRETS` or `.finlearn/secrets.toml` | API key file |
//!
//! # Examples
//!
//! ```bash
//! # Hourly candles for the last week
//! finlearn chart AAPL MSFT --period 7d --interval 1h
//!
//! # Plotly figure JSON for a browser front-end
//! finlearn chart NVDA --format json
//!
//! # Headlines about bonds
//! finlearn news --query bonds
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use finlearn_core::chat::DEFAULT_MODEL;
use finlearn_core::news::DEFAULT_QUERY;
use finlearn_core::{Interval, Period};

/// finlearn - market data, charts, news and chat for learning about investing
#[derive(Debug, Parser)]
#[command(
    name = "finlearn",
    author,
    version,
    about = "Market data, charts, news and chat for learning about investing"
)]
pub struct Cli {
    /// TOML file holding API keys ([newsapi], [alpha_vantage], [openai]).
    #[arg(long, global = true, value_name = "PATH")]
    pub secrets: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print one month of daily SPY closes as JSON.
    Overview(OverviewArgs),
    /// Draw candlestick charts for tickers.
    Chart(ChartArgs),
    /// Show recent headlines.
    News(NewsArgs),
    /// Chat with a hosted language model.
    Chat(ChatArgs),
}

#[derive(Debug, Args)]
pub struct OverviewArgs {
    /// Pretty-print JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Tickers to chart; each is fetched independently.
    #[arg(default_values_t = [String::from("AAPL"), String::from("MSFT")])]
    pub tickers: Vec<String>,

    /// Lookback period (1d, 5d, 7d, 1mo, 3mo, 6mo, 1y).
    #[arg(long, default_value = "7d")]
    pub period: Period,

    /// Bar interval (1m, 5m, 15m, 1h, 1d).
    #[arg(long, default_value = "1h")]
    pub interval: Interval,

    #[arg(long, value_enum, default_value_t = ChartFormat::Text)]
    pub format: ChartFormat,

    /// Text chart height in rows.
    #[arg(long, default_value_t = 16)]
    pub height: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartFormat {
    /// Terminal candlestick chart
    Text,
    /// Plotly figure JSON, one document per line
    Json,
}

#[derive(Debug, Args)]
pub struct NewsArgs {
    /// Search query.
    #[arg(long, short, default_value = DEFAULT_QUERY)]
    pub query: String,
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Chat-completion model name.
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,
}
