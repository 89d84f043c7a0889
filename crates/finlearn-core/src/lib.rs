//! # finlearn Core
//!
//! Market data, charting, news and chat relay for the finlearn toolkit.
//!
//! ## Overview
//!
//! - **Canonical domain models** for symbols, windows, bars and series
//! - **Provider adapters** for Yahoo Finance (primary) and Alpha Vantage (secondary)
//! - **Fallback fetcher** that tries each provider once, in order
//! - **Chart rendering** to a Plotly figure or a terminal candlestick chart
//! - **News search** that degrades to an empty list
//! - **Streaming chat relay** that commits replies only once complete
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo, Alpha Vantage) |
//! | [`chart`] | Candlestick figure and text rendering |
//! | [`chat`] | Transcript and streaming chat relay |
//! | [`config`] | API key configuration |
//! | [`data_source`] | Data source trait and error classification |
//! | [`domain`] | Domain models (Bar, Series, Symbol, Window) |
//! | [`error`] | Validation errors |
//! | [`fetcher`] | Primary/secondary fallback |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`news`] | NewsAPI headline search |
//! | [`normalize`] | Provider label and timestamp normalization |
//! | [`overview`] | SPY market overview |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use finlearn_core::{Interval, MarketDataFetcher, Period, Secrets, Symbol, Window};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let secrets = Secrets::load(None)?;
//!     let fetcher = MarketDataFetcher::from_secrets(&secrets);
//!
//!     let series = fetcher
//!         .fetch(&Symbol::parse("AAPL")?, Window::new(Period::SevenDays, Interval::OneHour))
//!         .await?;
//!     println!("{}", finlearn_core::chart::render_text(&series, 12));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Web API  │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ MarketData      │────▶│ Yahoo (primary)  │
//! │ Fetcher         │     └──────────────────┘
//! │                 │     ┌──────────────────┐
//! │                 │────▶│ Alpha Vantage    │──▶ normalize
//! └────────┬────────┘     └──────────────────┘
//!          │ Series
//!          ▼
//! ┌─────────────────┐
//! │ chart / overview│
//! └─────────────────┘
//! ```

pub mod adapters;
pub mod chart;
pub mod chat;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod news;
pub mod normalize;
pub mod overview;
pub mod source;

pub use adapters::{AlphaVantageAdapter, YahooAdapter};
pub use chat::{ChatError, ChatMessage, ChatRelay, CompletionClient, Role, Transcript};
pub use config::{ConfigError, Feature, Secrets};
pub use data_source::{BarsRequest, MarketDataSource, SourceError, SourceErrorKind};
pub use domain::{Bar, Interval, Period, Series, Symbol, UtcDateTime, Window};
pub use error::ValidationError;
pub use fetcher::{FetchError, MarketDataFetcher, ProviderAttempt};
pub use news::{NewsArticle, NewsClient};
pub use overview::{fetch_market_overview, MarketOverview};
pub use source::ProviderId;
