use finlearn_core::chart::{candlestick_figure, render_text};
use finlearn_core::{MarketDataFetcher, Secrets, Series, Symbol, Window};
use tracing::debug;

use crate::cli::{ChartArgs, ChartFormat};
use crate::error::CliError;

/// Render every ticker independently; one failure does not stop the rest.
pub async fn run(args: &ChartArgs, secrets: &Secrets) -> Result<(), CliError> {
    let fetcher = MarketDataFetcher::from_secrets(secrets);
    let window = Window::new(args.period, args.interval);
    let mut failed = 0;

    for ticker in &args.tickers {
        match chart_one(&fetcher, ticker, window, args).await {
            Ok(rendered) => println!("{rendered}"),
            Err(error) => {
                failed += 1;
                eprintln!("error: {ticker}: {error}");
            }
        }
    }

    if failed > 0 {
        return Err(CliError::PartialFailure {
            failed,
            total: args.tickers.len(),
        });
    }
    Ok(())
}

async fn chart_one(
    fetcher: &MarketDataFetcher,
    ticker: &str,
    window: Window,
    args: &ChartArgs,
) -> Result<String, CliError> {
    let symbol = Symbol::parse(ticker)?;
    let series = fetcher.fetch(&symbol, window).await?;
    if series.interval() != window.interval {
        debug!(
            symbol = %symbol,
            requested = %window.interval,
            delivered = %series.interval(),
            "provider delivered a different granularity"
        );
    }
    render(&series, args.format, args.height)
}

fn render(series: &Series, format: ChartFormat, height: usize) -> Result<String, CliError> {
    match format {
        ChartFormat::Text => Ok(render_text(series, height)),
        ChartFormat::Json => Ok(serde_json::to_string(&candlestick_figure(series))?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finlearn_core::{Bar, Interval, ProviderId, UtcDateTime};

    fn series() -> Series {
        let ts = UtcDateTime::parse("2024-01-02T15:00:00Z").expect("timestamp");
        let bar = Bar::new(ts, 10.0, 11.0, 9.0, 10.5, 100).expect("bar");
        Series::new(
            Symbol::parse("MSFT").expect("symbol"),
            ProviderId::Yahoo,
            Interval::OneHour,
            vec![bar],
        )
        .expect("series")
    }

    #[test]
    fn json_format_is_single_line_figure() {
        let rendered = render(&series(), ChartFormat::Json, 10).expect("json");

        assert!(!rendered.contains('\n'));
        let figure: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(figure["layout"]["title"]["text"], "MSFT Candlestick Chart");
    }

    #[test]
    fn text_format_uses_requested_height() {
        let rendered = render(&series(), ChartFormat::Text, 6).expect("text");
        assert_eq!(rendered.lines().count(), 8);
    }
}
