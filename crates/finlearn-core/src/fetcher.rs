//! Two-tier market data fetch: primary provider, then secondary on any failure.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::adapters::{AlphaVantageAdapter, YahooAdapter};
use crate::config::{Feature, Secrets};
use crate::data_source::{BarsRequest, MarketDataSource, SourceError};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{ProviderId, Series, Symbol, Window};

/// One failed provider call inside a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    pub provider: ProviderId,
    pub error: SourceError,
}

impl Display for ProviderAttempt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Every provider failed or returned nothing for the ticker.
    #[error("market data unavailable for {symbol} ({})", join_attempts(.attempts))]
    DataUnavailable {
        symbol: Symbol,
        attempts: Vec<ProviderAttempt>,
    },
}

impl FetchError {
    pub fn attempts(&self) -> &[ProviderAttempt] {
        match self {
            Self::DataUnavailable { attempts, .. } => attempts,
        }
    }
}

fn join_attempts(attempts: &[ProviderAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Primary-then-secondary fetcher.
///
/// Each fetch calls every provider at most once, in order, and keeps no state
/// between fetches.
#[derive(Clone)]
pub struct MarketDataFetcher {
    primary: Arc<dyn MarketDataSource>,
    secondary: Arc<dyn MarketDataSource>,
}

impl MarketDataFetcher {
    pub fn new(primary: Arc<dyn MarketDataSource>, secondary: Arc<dyn MarketDataSource>) -> Self {
        Self { primary, secondary }
    }

    /// Yahoo primary and Alpha Vantage secondary over a shared transport.
    pub fn with_http_client(
        http_client: Arc<dyn HttpClient>,
        alphavantage_key: Option<String>,
    ) -> Self {
        Self::new(
            Arc::new(YahooAdapter::with_http_client(http_client.clone())),
            Arc::new(AlphaVantageAdapter::with_http_client(
                http_client,
                alphavantage_key,
            )),
        )
    }

    /// Production fetcher; the secondary is keyed from [`Feature::MarketDataFallback`].
    pub fn from_secrets(secrets: &Secrets) -> Self {
        Self::with_http_client(
            Arc::new(ReqwestHttpClient::new()),
            secrets
                .api_key(Feature::MarketDataFallback)
                .map(str::to_owned),
        )
    }

    /// Fetch bars for `symbol`, falling back to the secondary provider when
    /// the primary errors or returns nothing.
    ///
    /// The returned series is tagged with the provider that answered and the
    /// interval it delivered, which may differ from `window.interval`.
    ///
    /// # Errors
    ///
    /// [`FetchError::DataUnavailable`] carrying both attempts when neither
    /// provider produced bars.
    pub async fn fetch(&self, symbol: &Symbol, window: Window) -> Result<Series, FetchError> {
        let mut attempts = Vec::with_capacity(2);

        for source in [&self.primary, &self.secondary] {
            let provider = source.id();
            let request = BarsRequest::new(symbol.clone(), window);

            match source.bars(request).await {
                Ok(series) => {
                    debug!(
                        symbol = %symbol,
                        provider = %provider,
                        bars = series.len(),
                        failed_attempts = attempts.len(),
                        "market data fetched"
                    );
                    return Ok(series);
                }
                Err(error) => {
                    warn!(
                        symbol = %symbol,
                        provider = %provider,
                        error = %error,
                        "market data provider failed"
                    );
                    attempts.push(ProviderAttempt { provider, error });
                }
            }
        }

        Err(FetchError::DataUnavailable {
            symbol: symbol.clone(),
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::data_source::{BarsFuture, SourceErrorKind};
    use crate::{Bar, Interval, Period, UtcDateTime};

    struct FixedSource {
        id: ProviderId,
        outcome: Result<(), SourceError>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn healthy(id: ProviderId) -> Self {
            Self {
                id,
                outcome: Ok(()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(id: ProviderId, error: SourceError) -> Self {
            Self {
                id,
                outcome: Err(error),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl MarketDataSource for FixedSource {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn bars<'a>(&'a self, req: BarsRequest) -> BarsFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self.outcome.clone().and_then(|()| {
                let ts = UtcDateTime::parse("2024-01-02T00:00:00Z").expect("timestamp");
                let bar = Bar::new(ts, 1.0, 2.0, 0.5, 1.5, 10).expect("bar");
                Ok(Series::new(req.symbol, self.id, req.window.interval, vec![bar])?)
            });
            Box::pin(async move { outcome })
        }
    }

    fn spy() -> Symbol {
        Symbol::parse("SPY").expect("symbol")
    }

    fn daily_month() -> Window {
        Window::new(Period::OneMonth, Interval::OneDay)
    }

    #[tokio::test]
    async fn healthy_primary_skips_secondary() {
        let primary = Arc::new(FixedSource::healthy(ProviderId::Yahoo));
        let secondary = Arc::new(FixedSource::healthy(ProviderId::Alphavantage));
        let fetcher = MarketDataFetcher::new(primary.clone(), secondary.clone());

        let series = fetcher.fetch(&spy(), daily_month()).await.expect("data");

        assert_eq!(series.provider(), ProviderId::Yahoo);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn both_failures_are_reported_in_order() {
        let fetcher = MarketDataFetcher::new(
            Arc::new(FixedSource::failing(
                ProviderId::Yahoo,
                SourceError::empty_result("no rows"),
            )),
            Arc::new(FixedSource::failing(
                ProviderId::Alphavantage,
                SourceError::configuration_missing("no key"),
            )),
        );

        let error = fetcher
            .fetch(&spy(), daily_month())
            .await
            .expect_err("both failed");

        let kinds = error
            .attempts()
            .iter()
            .map(|attempt| (attempt.provider, attempt.error.kind()))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                (ProviderId::Yahoo, SourceErrorKind::EmptyResult),
                (ProviderId::Alphavantage, SourceErrorKind::ConfigurationMissing),
            ]
        );
        assert!(error.to_string().starts_with("market data unavailable for SPY"));
    }
}
