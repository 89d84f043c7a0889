//! Label and timestamp normalization for tabular provider payloads.
//!
//! Alpha Vantage keys its OHLCV columns as `1. open` .. `5. volume` and stamps
//! rows with wall-clock strings. This module renames those labels onto the
//! canonical schema and coerces timestamps into [`UtcDateTime`]. Both steps
//! are idempotent: canonical labels and RFC3339 timestamps pass through
//! unchanged, so rows rebuilt from normalized bars normalize to the same bars.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{Bar, SourceError, UtcDateTime};

/// Canonical OHLCV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::High,
        Self::Low,
        Self::Close,
        Self::Volume,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        }
    }
}

/// One provider row: a raw timestamp and its labelled string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub timestamp: String,
    pub fields: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(label.into(), value.into());
        self
    }
}

impl From<&Bar> for RawRow {
    fn from(bar: &Bar) -> Self {
        Self::new(bar.ts.format_rfc3339())
            .with_field(Field::Open.label(), bar.open.to_string())
            .with_field(Field::High.label(), bar.high.to_string())
            .with_field(Field::Low.label(), bar.low.to_string())
            .with_field(Field::Close.label(), bar.close.to_string())
            .with_field(Field::Volume.label(), bar.volume.to_string())
    }
}

/// Map a provider column label onto a canonical field.
///
/// Strips an enumerating prefix (`"4. close"`) and ignores case, so `Close`,
/// `close` and `4. close` all resolve to [`Field::Close`]. Adjusted or
/// derived columns are not OHLCV and resolve to `None`.
pub fn canonical_field(label: &str) -> Option<Field> {
    let trimmed = label.trim();
    let unprefixed = match trimmed.split_once(". ") {
        Some((prefix, rest)) if prefix.chars().all(|ch| ch.is_ascii_digit()) => rest,
        _ => trimmed,
    };

    match unprefixed.to_ascii_lowercase().as_str() {
        "open" => Some(Field::Open),
        "high" => Some(Field::High),
        "low" => Some(Field::Low),
        "close" => Some(Field::Close),
        "volume" => Some(Field::Volume),
        _ => None,
    }
}

/// Rename a row's labels to canonical ones, dropping non-OHLCV columns.
pub fn rename_fields(row: RawRow) -> RawRow {
    let fields = row
        .fields
        .into_iter()
        .filter_map(|(label, value)| {
            canonical_field(&label).map(|field| (field.label().to_owned(), value))
        })
        .collect();

    RawRow {
        timestamp: row.timestamp,
        fields,
    }
}

/// Convert provider rows into ascending, de-duplicated canonical bars.
///
/// Rows with unparseable timestamps, missing prices or out-of-range OHLC are
/// skipped. Later rows win when two timestamps coerce to the same instant.
///
/// # Errors
///
/// [`SourceErrorKind::EmptyResult`](crate::SourceErrorKind::EmptyResult) when
/// no row survives.
pub fn normalize_rows(rows: impl IntoIterator<Item = RawRow>) -> Result<Vec<Bar>, SourceError> {
    let mut by_time = BTreeMap::new();
    let mut skipped = 0_usize;

    for row in rows {
        match row_to_bar(rename_fields(row)) {
            Some(bar) => {
                by_time.insert(bar.ts, bar);
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, kept = by_time.len(), "skipped unusable provider rows");
    }

    if by_time.is_empty() {
        return Err(SourceError::empty_result("no usable rows after normalization"));
    }

    Ok(by_time.into_values().collect())
}

fn row_to_bar(row: RawRow) -> Option<Bar> {
    let ts = UtcDateTime::coerce(&row.timestamp).ok()?;
    let price = |field: Field| -> Option<f64> {
        row.fields
            .get(field.label())
            .and_then(|raw| raw.trim().parse::<f64>().ok())
    };

    let volume = row
        .fields
        .get(Field::Volume.label())
        .and_then(|raw| parse_volume(raw))
        .unwrap_or(0);

    Bar::new(
        ts,
        price(Field::Open)?,
        price(Field::High)?,
        price(Field::Low)?,
        price(Field::Close)?,
        volume,
    )
    .ok()
}

fn parse_volume(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(|value| value.round() as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_row(ts: &str, open: &str, high: &str, low: &str, close: &str) -> RawRow {
        RawRow::new(ts)
            .with_field("1. open", open)
            .with_field("2. high", high)
            .with_field("3. low", low)
            .with_field("4. close", close)
            .with_field("5. volume", "1200")
    }

    #[test]
    fn resolves_prefixed_and_plain_labels() {
        assert_eq!(canonical_field("1. open"), Some(Field::Open));
        assert_eq!(canonical_field("Close"), Some(Field::Close));
        assert_eq!(canonical_field("volume"), Some(Field::Volume));
        assert_eq!(canonical_field("5. adjusted close"), None);
        assert_eq!(canonical_field("10. high"), Some(Field::High));
    }

    #[test]
    fn rename_drops_unknown_columns() {
        let renamed = rename_fields(
            alpha_row("2024-01-02 10:00:00", "1", "2", "0.5", "1.5")
                .with_field("7. dividend amount", "0.0"),
        );

        let labels = renamed.fields.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(labels, vec!["close", "high", "low", "open", "volume"]);
    }

    #[test]
    fn normalizes_descending_rows_into_ascending_bars() {
        let bars = normalize_rows(vec![
            alpha_row("2024-01-02 11:00:00", "10.5", "11", "10", "10.8"),
            alpha_row("2024-01-02 10:00:00", "10", "10.6", "9.9", "10.5"),
        ])
        .expect("rows normalize");

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].ts.format_rfc3339(), "2024-01-02T10:00:00Z");
        assert_eq!(bars[1].close, 10.8);
        assert_eq!(bars[1].volume, 1200);
    }

    #[test]
    fn skips_broken_rows_and_reports_empty() {
        let result = normalize_rows(vec![
            alpha_row("not a time", "1", "2", "0.5", "1.5"),
            alpha_row("2024-01-02 10:00:00", "abc", "2", "0.5", "1.5"),
            alpha_row("2024-01-02 11:00:00", "3", "2", "0.5", "1.5"),
        ]);

        let error = result.expect_err("nothing usable");
        assert_eq!(error.kind(), crate::SourceErrorKind::EmptyResult);
    }

    #[test]
    fn fractional_volume_is_rounded() {
        assert_eq!(parse_volume("1500.6"), Some(1501));
        assert_eq!(parse_volume("-3"), None);
    }
}
