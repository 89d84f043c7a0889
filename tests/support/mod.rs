//! Provider payload fixtures shared by the behavior tests.

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use time::{Duration, OffsetDateTime, Weekday};

pub const YAHOO_HOST: &str = "query1.finance.yahoo.com";
pub const ALPHAVANTAGE_HOST: &str = "alphavantage.co";
pub const NEWSAPI_HOST: &str = "newsapi.org";

/// 2024-01-02 14:30 UTC, the first regular session open of 2024.
const FIRST_OPEN_UNIX: i64 = 1_704_205_800;

fn trading_days(count: usize) -> Vec<OffsetDateTime> {
    let mut day = OffsetDateTime::from_unix_timestamp(FIRST_OPEN_UNIX).expect("valid unix time");
    let mut days = Vec::with_capacity(count);
    while days.len() < count {
        if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
            days.push(day);
        }
        day += Duration::days(1);
    }
    days
}

/// Yahoo chart payload with `sessions` daily bars for an exchange at UTC-5.
pub fn yahoo_daily_chart(symbol: &str, sessions: usize) -> String {
    let days = trading_days(sessions);
    let closes = (0..sessions)
        .map(|i| 470.0 + i as f64 * 0.5)
        .collect::<Vec<_>>();

    json!({
        "chart": {
            "result": [{
                "meta": { "symbol": symbol, "currency": "USD", "gmtoffset": -18000 },
                "timestamp": days.iter().map(|day| day.unix_timestamp()).collect::<Vec<_>>(),
                "indicators": { "quote": [{
                    "open": closes.iter().map(|close| close - 0.25).collect::<Vec<_>>(),
                    "high": closes.iter().map(|close| close + 1.0).collect::<Vec<_>>(),
                    "low": closes.iter().map(|close| close - 1.0).collect::<Vec<_>>(),
                    "close": closes,
                    "volume": vec![75_000_000_u64; sessions],
                }]},
            }],
            "error": null,
        }
    })
    .to_string()
}

/// Yahoo chart payload that succeeds with no rows.
pub fn yahoo_empty_chart() -> String {
    json!({
        "chart": {
            "result": [{ "meta": { "gmtoffset": -18000 }, "indicators": { "quote": [{}] } }],
            "error": null,
        }
    })
    .to_string()
}

/// Yahoo's 404 body for an unknown ticker.
pub fn yahoo_not_found() -> String {
    json!({
        "chart": {
            "result": null,
            "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" },
        }
    })
    .to_string()
}

/// Alpha Vantage 60min table, newest first, `hours` bars per session.
pub fn alphavantage_hourly(sessions: usize, hours: usize) -> String {
    let mut table = Map::new();
    for (day_index, day) in trading_days(sessions).iter().enumerate() {
        for hour in 0..hours {
            let stamp = format!("{} {:02}:00:00", day.date(), 10 + hour);
            let open = 470.0 + day_index as f64 + hour as f64 * 0.1;
            table.insert(
                stamp,
                json!({
                    "1. open": format!("{open:.4}"),
                    "2. high": format!("{:.4}", open + 0.5),
                    "3. low": format!("{:.4}", open - 0.5),
                    "4. close": format!("{:.4}", open + 0.2),
                    "5. volume": "150000",
                }),
            );
        }
    }

    let mut payload = Map::new();
    payload.insert(
        "Meta Data".into(),
        json!({ "1. Information": "Intraday (60min) open, high, low, close prices and volume" }),
    );
    payload.insert("Time Series (60min)".into(), Value::Object(table));
    Value::Object(payload).to_string()
}

pub fn alphavantage_invalid_symbol() -> String {
    json!({ "Error Message": "Invalid API call. Please retry or visit the documentation (https://www.alphavantage.co/documentation/) for TIME_SERIES_INTRADAY." })
        .to_string()
}

/// A well-formed response whose time series table has no rows.
pub fn alphavantage_empty_table() -> String {
    json!({ "Meta Data": {}, "Time Series (60min)": {} }).to_string()
}
