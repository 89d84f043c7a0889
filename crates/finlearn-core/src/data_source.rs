//! Market data source trait and its error classification.
//!
//! Every provider adapter implements [`MarketDataSource`]; the
//! [`MarketDataFetcher`](crate::MarketDataFetcher) tries them in order and uses
//! [`SourceErrorKind`] to describe why an attempt was abandoned.
//!
//! # Example
//!
//! ```rust,ignore
//! use finlearn_core::{BarsRequest, MarketDataSource, Period, Interval, Symbol, Window, YahooAdapter};
//!
//! async fn daily_spy(adapter: &YahooAdapter) -> Result<(), finlearn_core::SourceError> {
//!     let request = BarsRequest::new(
//!         Symbol::parse("SPY")?,
//!         Window::new(Period::OneMonth, Interval::OneDay),
//!     );
//!     let series = adapter.bars(request).await?;
//!     println!("{} bars from {}", series.len(), series.provider());
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{ProviderId, Series, Symbol, ValidationError, Window};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Network failure or non-success HTTP status.
    Transport,
    /// The call succeeded but carried no usable rows.
    EmptyResult,
    /// The payload could not be decoded into the expected shape.
    Malformed,
    /// The provider rejected the request (unknown ticker, bad parameters).
    InvalidRequest,
    /// A required API key is not configured.
    ConfigurationMissing,
}

/// Structured source error used by fallback decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Transport, message)
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::EmptyResult, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Malformed, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    pub fn configuration_missing(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::ConfigurationMissing, message)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::EmptyResult => "source.empty_result",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::ConfigurationMissing => "source.configuration_missing",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::EmptySeries => Self::empty_result(error.to_string()),
            other => Self::malformed(other.to_string()),
        }
    }
}

/// Request payload for bar endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsRequest {
    pub symbol: Symbol,
    pub window: Window,
}

impl BarsRequest {
    pub fn new(symbol: Symbol, window: Window) -> Self {
        Self { symbol, window }
    }
}

/// Boxed future returned by [`MarketDataSource::bars`].
pub type BarsFuture<'a> = Pin<Box<dyn Future<Output = Result<Series, SourceError>> + Send + 'a>>;

/// Market data provider contract.
///
/// Implementations translate the provider's own schema into a [`Series`] and
/// must never return an empty-but-ok result: no rows means
/// [`SourceErrorKind::EmptyResult`].
pub trait MarketDataSource: Send + Sync {
    /// Returns the provider identifier stamped on produced series.
    fn id(&self) -> ProviderId;

    /// Fetches OHLCV bars for the requested window.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the provider is unreachable, rejects the
    /// ticker, returns no rows, or returns an undecodable payload.
    fn bars<'a>(&'a self, req: BarsRequest) -> BarsFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_maps_to_empty_result() {
        let error = SourceError::from(ValidationError::EmptySeries);
        assert_eq!(error.kind(), SourceErrorKind::EmptyResult);
        assert_eq!(error.code(), "source.empty_result");
    }

    #[test]
    fn display_includes_code() {
        let error = SourceError::transport("connection reset");
        assert_eq!(error.to_string(), "connection reset (source.transport)");
    }
}
