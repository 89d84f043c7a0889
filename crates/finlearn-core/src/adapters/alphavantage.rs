use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::data_source::{BarsFuture, BarsRequest, MarketDataSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::normalize::{normalize_rows, RawRow};
use crate::{Interval, ProviderId, Series};

const QUERY_ENDPOINT: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage intraday time-series adapter (secondary provider).
///
/// Alpha Vantage reports invalid symbols and throttling as HTTP 200 with an
/// `Error Message`, `Note` or `Information` key instead of a time series, so
/// the body is inspected before normalization.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: Option<String>,
}

impl AlphaVantageAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), api_key)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    async fn fetch_bars(&self, req: &BarsRequest) -> Result<Series, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::configuration_missing(
                "alphavantage api key is not configured",
            ));
        };

        let interval = delivered_interval(req.window.interval);
        let endpoint = format!(
            "{QUERY_ENDPOINT}?function=TIME_SERIES_INTRADAY&symbol={}&interval={}&outputsize=full&apikey={}",
            urlencoding::encode(req.symbol.as_str()),
            alphavantage_interval(interval),
            urlencoding::encode(api_key),
        );
        debug!(
            symbol = %req.symbol,
            interval = alphavantage_interval(interval),
            "requesting alphavantage intraday series"
        );

        let response = self
            .http_client
            .execute(HttpRequest::get(endpoint).with_timeout_ms(10_000))
            .await
            .map_err(|e| {
                SourceError::transport(format!("alphavantage transport error: {}", e.message()))
            })?;

        if !response.is_success() {
            return Err(SourceError::transport(format!(
                "alphavantage returned status {}",
                response.status
            )));
        }

        let payload: BTreeMap<String, Value> = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::malformed(format!("failed to parse alphavantage response: {e}"))
        })?;

        let rows = time_series_rows(&payload)?;
        let bars = normalize_rows(rows)?;
        let series = Series::new(req.symbol.clone(), ProviderId::Alphavantage, interval, bars)?;

        Ok(series.trailing(req.window.period.duration()))
    }
}

impl MarketDataSource for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn bars<'a>(&'a self, req: BarsRequest) -> BarsFuture<'a> {
        Box::pin(async move { self.fetch_bars(&req).await })
    }
}

/// Intraday endpoint has no daily granularity; daily windows use hourly bars.
const fn delivered_interval(requested: Interval) -> Interval {
    match requested {
        Interval::OneDay => Interval::OneHour,
        other => other,
    }
}

const fn alphavantage_interval(interval: Interval) -> &'static str {
    match interval {
        Interval::OneMinute => "1min",
        Interval::FiveMinutes => "5min",
        Interval::FifteenMinutes => "15min",
        Interval::OneHour | Interval::OneDay => "60min",
    }
}

fn time_series_rows(payload: &BTreeMap<String, Value>) -> Result<Vec<RawRow>, SourceError> {
    if let Some(message) = payload.get("Error Message").and_then(Value::as_str) {
        return Err(SourceError::invalid_request(format!(
            "alphavantage rejected request: {message}"
        )));
    }

    for notice in ["Note", "Information"] {
        if let Some(message) = payload.get(notice).and_then(Value::as_str) {
            return Err(SourceError::transport(format!("alphavantage notice: {message}")));
        }
    }

    let Some(table) = payload
        .iter()
        .find(|(key, _)| key.starts_with("Time Series"))
        .map(|(_, table)| table)
    else {
        return Err(SourceError::empty_result(
            "alphavantage response contained no time series",
        ));
    };

    let table = table
        .as_object()
        .ok_or_else(|| SourceError::malformed("alphavantage time series is not an object"))?;

    Ok(table
        .iter()
        .filter_map(|(timestamp, cells)| {
            let cells = cells.as_object()?;
            Some(cells.iter().fold(RawRow::new(timestamp.as_str()), |row, (label, value)| {
                match value {
                    Value::String(text) => row.with_field(label.as_str(), text.as_str()),
                    Value::Number(number) => row.with_field(label.as_str(), number.to_string()),
                    _ => row,
                }
            }))
        })
        .collect())
}
