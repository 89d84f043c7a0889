mod chart;
mod chat;
mod news;
mod overview;

use finlearn_core::Secrets;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let secrets = Secrets::load(cli.secrets.as_deref())?;

    match &cli.command {
        Command::Overview(args) => overview::run(args, &secrets).await,
        Command::Chart(args) => chart::run(args, &secrets).await,
        Command::News(args) => news::run(args, &secrets).await,
        Command::Chat(args) => chat::run(args, &secrets).await,
    }
}
