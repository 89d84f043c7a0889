use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{Interval, ProviderId, Symbol, UtcDateTime, ValidationError};

/// OHLCV bar record for a given interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// Non-empty, strictly time-ordered bars for one symbol from one provider.
///
/// `interval` records the granularity the provider actually delivered, which
/// may be finer than what was requested when the fallback provider answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: Symbol,
    provider: ProviderId,
    interval: Interval,
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(
        symbol: Symbol,
        provider: ProviderId,
        interval: Interval,
        bars: Vec<Bar>,
    ) -> Result<Self, ValidationError> {
        if bars.is_empty() {
            return Err(ValidationError::EmptySeries);
        }

        if let Some(index) = bars
            .windows(2)
            .position(|pair| pair[0].ts >= pair[1].ts)
        {
            return Err(ValidationError::UnorderedSeries { index: index + 1 });
        }

        Ok(Self {
            symbol,
            provider,
            interval,
            bars,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> &Bar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Keep only bars no older than `span` before the newest bar.
    pub fn trailing(mut self, span: Duration) -> Self {
        let cutoff = self.last().ts.into_inner() - span;
        self.bars.retain(|bar| bar.ts.into_inner() > cutoff);
        self
    }

    /// Aggregate intraday bars into one bar per UTC calendar date.
    ///
    /// First open, highest high, lowest low, last close, summed volume.
    /// Daily series are returned unchanged.
    pub fn to_daily(&self) -> Self {
        if !self.interval.is_intraday() {
            return self.clone();
        }

        let mut daily: Vec<Bar> = Vec::new();
        for bar in &self.bars {
            let date = bar.ts.date();
            match daily.last_mut() {
                Some(current) if current.ts.date() == date => {
                    current.high = current.high.max(bar.high);
                    current.low = current.low.min(bar.low);
                    current.close = bar.close;
                    current.volume = current.volume.saturating_add(bar.volume);
                }
                _ => daily.push(Bar {
                    ts: UtcDateTime::from_date(date),
                    ..bar.clone()
                }),
            }
        }

        Self {
            symbol: self.symbol.clone(),
            provider: self.provider,
            interval: Interval::OneDay,
            bars: daily,
        }
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
