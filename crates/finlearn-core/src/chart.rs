//! Candlestick rendering.
//!
//! [`candlestick_figure`] produces a Plotly figure document for browser
//! front-ends; [`render_text`] draws the same candles into a fixed-height
//! block of terminal text. Both are pure functions of a [`Series`].

use serde_json::{json, Value};

use crate::{Bar, Series};

/// Widest text chart, in candles. Older bars are dropped first.
pub const MAX_TEXT_COLUMNS: usize = 60;

const SCALE_WIDTH: usize = 10;
const WICK: char = '│';
const UP_BODY: char = '█';
const DOWN_BODY: char = '░';

/// Plotly candlestick figure for `series`.
///
/// Daily series label the x axis with calendar dates; intraday series with
/// `YYYY-MM-DD HH:MM` stamps.
pub fn candlestick_figure(series: &Series) -> Value {
    let bars = series.bars();
    let x = bars
        .iter()
        .map(|bar| axis_label(series, bar))
        .collect::<Vec<_>>();

    json!({
        "data": [{
            "type": "candlestick",
            "name": series.symbol().as_str(),
            "x": x,
            "open": bars.iter().map(|bar| bar.open).collect::<Vec<_>>(),
            "high": bars.iter().map(|bar| bar.high).collect::<Vec<_>>(),
            "low": bars.iter().map(|bar| bar.low).collect::<Vec<_>>(),
            "close": series.closes(),
        }],
        "layout": {
            "title": { "text": format!("{} Candlestick Chart", series.symbol()) },
            "xaxis": { "title": { "text": "Time" }, "rangeslider": { "visible": false } },
            "yaxis": { "title": { "text": "Price (USD)" } },
            "template": "plotly_dark",
            "height": 400,
        },
    })
}

fn axis_label(series: &Series, bar: &Bar) -> String {
    if series.interval().is_intraday() {
        bar.ts.format_short()
    } else {
        bar.ts.format_date()
    }
}

/// Fixed-height text candlestick chart with a price scale on the left.
///
/// One column per bar, newest on the right. Wicks are drawn with `│`, up
/// bodies with `█` and down bodies with `░`. `height` is clamped to at least
/// two rows.
pub fn render_text(series: &Series, height: usize) -> String {
    let height = height.max(2);
    let bars = series.bars();
    let bars = &bars[bars.len().saturating_sub(MAX_TEXT_COLUMNS)..];

    let top = bars.iter().map(|bar| bar.high).fold(f64::MIN, f64::max);
    let bottom = bars.iter().map(|bar| bar.low).fold(f64::MAX, f64::min);
    let scale = PriceScale::new(top, bottom, height);

    let mut grid = vec![vec![' '; bars.len()]; height];
    for (column, bar) in bars.iter().enumerate() {
        for row in scale.row(bar.high)..=scale.row(bar.low) {
            grid[row][column] = WICK;
        }

        let body = if bar.is_up() { UP_BODY } else { DOWN_BODY };
        for row in scale.row(bar.open.max(bar.close))..=scale.row(bar.open.min(bar.close)) {
            grid[row][column] = body;
        }
    }

    let last = series.last();
    let mut lines = Vec::with_capacity(height + 2);
    lines.push(format!(
        "{} ({}, {}) last close {:.2}",
        series.symbol(),
        series.provider(),
        series.interval(),
        last.close
    ));

    for (row, cells) in grid.into_iter().enumerate() {
        let label = if row % 4 == 0 || row + 1 == height {
            format!("{:>width$.2}", scale.level(row), width = SCALE_WIDTH)
        } else {
            " ".repeat(SCALE_WIDTH)
        };
        let cells = cells.into_iter().collect::<String>();
        lines.push(format!("{label} ┤{cells}").trim_end().to_owned());
    }

    let first = bars.first().unwrap_or(last);
    lines.push(format!(
        "{} {} .. {}",
        " ".repeat(SCALE_WIDTH),
        axis_label(series, first),
        axis_label(series, last)
    ));

    lines.join("\n")
}

struct PriceScale {
    top: f64,
    span: f64,
    rows: usize,
}

impl PriceScale {
    fn new(top: f64, bottom: f64, rows: usize) -> Self {
        Self {
            top,
            span: top - bottom,
            rows,
        }
    }

    /// Row index for `price`; row 0 is the highest price.
    fn row(&self, price: f64) -> usize {
        if self.span <= 0.0 {
            return 0;
        }
        let offset = (self.top - price) / self.span * (self.rows - 1) as f64;
        (offset.round().max(0.0) as usize).min(self.rows - 1)
    }

    fn level(&self, row: usize) -> f64 {
        self.top - self.span * row as f64 / (self.rows - 1) as f64
    }
}
