//! # Domain Models
//!
//! Canonical domain types for finlearn market data.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Bar`] | OHLCV bar with timestamp |
//! | [`Series`] | Non-empty, strictly ordered bars for one symbol |
//! | [`Symbol`] | Validated ticker |
//! | [`Interval`] | Bar interval (1m, 5m, 15m, 1h, 1d) |
//! | [`Period`] | Lookback range (1d .. 1y) |
//! | [`Window`] | Period plus interval |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! All types enforce their invariants at construction time:
//!
//! ```rust,ignore
//! use finlearn_core::{Bar, UtcDateTime, ValidationError};
//!
//! let ts = UtcDateTime::parse("2024-01-02T00:00:00Z")?;
//! let bar = Bar::new(ts, 100.0, 105.0, 95.0, 102.0, 1_000)?;
//!
//! // high < low
//! let invalid = Bar::new(ts, 100.0, 95.0, 105.0, 102.0, 1_000);
//! assert!(matches!(invalid, Err(ValidationError::InvalidBarRange)));
//! ```

mod interval;
mod models;
mod symbol;
mod timestamp;

pub use interval::{Interval, Period, Window};
pub use models::{Bar, Series};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
