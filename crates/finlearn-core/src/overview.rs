//! Fixed SPY price history for the landing chart.

use serde::{Deserialize, Serialize};

use crate::fetcher::{FetchError, MarketDataFetcher};
use crate::{Interval, Period, Series, Symbol, Window};

pub const OVERVIEW_TICKER: &str = "SPY";
pub const OVERVIEW_WINDOW: Window = Window::new(Period::OneMonth, Interval::OneDay);

/// Daily closes with their `YYYY-MM-DD` dates, aligned index for index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub prices: Vec<f64>,
    pub timestamps: Vec<String>,
}

impl MarketOverview {
    /// Build from any series; intraday bars are collapsed to one per date first.
    pub fn from_series(series: &Series) -> Self {
        let daily = series.to_daily();
        let (prices, timestamps) = daily
            .bars()
            .iter()
            .map(|bar| (bar.close, bar.ts.format_date()))
            .unzip();

        Self { prices, timestamps }
    }
}

/// Fetch one month of daily SPY closes.
pub async fn fetch_market_overview(
    fetcher: &MarketDataFetcher,
) -> Result<MarketOverview, FetchError> {
    let series = fetcher
        .fetch(&Symbol::known(OVERVIEW_TICKER), OVERVIEW_WINDOW)
        .await?;
    Ok(MarketOverview::from_series(&series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bar, ProviderId, UtcDateTime};

    #[test]
    fn hourly_fallback_series_becomes_daily_points() {
        let bar = |ts: &str, close: f64| {
            let ts = UtcDateTime::parse(ts).expect("timestamp");
            Bar::new(ts, close, close, close, close, 1).expect("bar")
        };
        let series = Series::new(
            Symbol::known(OVERVIEW_TICKER),
            ProviderId::Alphavantage,
            Interval::OneHour,
            vec![
                bar("2024-01-02T15:00:00Z", 470.0),
                bar("2024-01-02T16:00:00Z", 471.0),
                bar("2024-01-03T15:00:00Z", 468.0),
            ],
        )
        .expect("series");

        let overview = MarketOverview::from_series(&series);

        assert_eq!(overview.timestamps, vec!["2024-01-02", "2024-01-03"]);
        assert_eq!(overview.prices, vec![471.0, 468.0]);
    }
}
