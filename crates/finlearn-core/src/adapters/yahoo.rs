use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::data_source::{BarsFuture, BarsRequest, MarketDataSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{Bar, Interval, ProviderId, Series, UtcDateTime};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart API adapter (primary provider).
///
/// The chart endpoint answers anonymously; no key or cookie is required.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    async fn fetch_bars(&self, req: &BarsRequest) -> Result<Series, SourceError> {
        let endpoint = format!(
            "{CHART_ENDPOINT}/{}?range={}&interval={}&includePrePost=false",
            urlencoding::encode(req.symbol.as_str()),
            req.window.period.as_str(),
            yahoo_interval(req.window.interval),
        );
        debug!(symbol = %req.symbol, url = %endpoint, "requesting yahoo chart");

        let request = HttpRequest::get(&endpoint)
            .with_header("accept", "application/json")
            .with_timeout_ms(10_000);

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::transport(format!("yahoo transport error: {}", e.message()))
        })?;

        if !response.is_success() {
            let detail = serde_json::from_str::<YahooChartResponse>(&response.body)
                .ok()
                .and_then(|chart| chart.chart.error)
                .map(|error| error.to_string());

            let message = match detail {
                Some(detail) => format!("yahoo returned status {}: {detail}", response.status),
                None => format!("yahoo returned status {}", response.status),
            };

            return Err(if response.status == 404 {
                SourceError::invalid_request(message)
            } else {
                SourceError::transport(message)
            });
        }

        let chart: YahooChartResponse = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::malformed(format!("failed to parse yahoo chart: {e}")))?;

        if let Some(error) = chart.chart.error {
            return Err(SourceError::invalid_request(format!(
                "yahoo chart API error: {error}"
            )));
        }

        let result = chart
            .chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::empty_result("yahoo chart contained no result"))?;

        let bars = chart_bars(&result, req.window.interval)?;
        Ok(Series::new(
            req.symbol.clone(),
            ProviderId::Yahoo,
            req.window.interval,
            bars,
        )?)
    }
}

impl MarketDataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn bars<'a>(&'a self, req: BarsRequest) -> BarsFuture<'a> {
        Box::pin(async move { self.fetch_bars(&req).await })
    }
}

const fn yahoo_interval(interval: Interval) -> &'static str {
    match interval {
        Interval::OneMinute => "1m",
        Interval::FiveMinutes => "5m",
        Interval::FifteenMinutes => "15m",
        Interval::OneHour => "60m",
        Interval::OneDay => "1d",
    }
}

/// Zip the columnar chart arrays into bars.
///
/// Rows with any missing OHLC value are dropped (Yahoo pads halted sessions
/// with nulls). Daily bars are stamped at midnight UTC of the exchange-local
/// trading date so they serialize to the session's calendar date.
fn chart_bars(result: &YahooChartResult, interval: Interval) -> Result<Vec<Bar>, SourceError> {
    let timestamps = result.timestamp.as_deref().unwrap_or_default();
    let Some(quote) = result.indicators.quote.first() else {
        return Err(SourceError::empty_result("yahoo chart contained no quote block"));
    };
    let gmt_offset = result.meta.as_ref().map_or(0, |meta| meta.gmtoffset);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &unix) in timestamps.iter().enumerate() {
        let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(i),
            quote.high.get(i),
            quote.low.get(i),
            quote.close.get(i),
        ) else {
            continue;
        };

        let ts = if interval.is_intraday() {
            UtcDateTime::from_unix_timestamp(unix)?
        } else {
            let local = unix.checked_add(gmt_offset).ok_or_else(|| {
                SourceError::malformed(format!(
                    "yahoo timestamp {unix} out of range for gmtoffset {gmt_offset}"
                ))
            })?;
            UtcDateTime::from_date(UtcDateTime::from_unix_timestamp(local)?.date())
        };

        let volume = quote
            .volume
            .get(i)
            .copied()
            .flatten()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map_or(0, |value| value.round() as u64);

        if let Ok(bar) = Bar::new(ts, *open, *high, *low, *close, volume) {
            if bars.last().is_some_and(|last: &Bar| last.ts >= bar.ts) {
                // Yahoo appends a live partial bar that can share the last session date.
                bars.pop();
            }
            bars.push(bar);
        }
    }

    if bars.is_empty() {
        return Err(SourceError::empty_result("yahoo chart contained no complete bars"));
    }

    Ok(bars)
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

impl std::fmt::Display for YahooChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {description}", self.code),
            None => f.write_str(&self.code),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}
