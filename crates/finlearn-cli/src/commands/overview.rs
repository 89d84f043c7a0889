use finlearn_core::{fetch_market_overview, MarketDataFetcher, MarketOverview, Secrets};

use crate::cli::OverviewArgs;
use crate::error::CliError;

pub async fn run(args: &OverviewArgs, secrets: &Secrets) -> Result<(), CliError> {
    let fetcher = MarketDataFetcher::from_secrets(secrets);
    let overview = fetch_market_overview(&fetcher).await?;
    println!("{}", render(&overview, args.pretty)?);
    Ok(())
}

fn render(overview: &MarketOverview, pretty: bool) -> Result<String, CliError> {
    Ok(if pretty {
        serde_json::to_string_pretty(overview)?
    } else {
        serde_json::to_string(overview)?
    })
}
