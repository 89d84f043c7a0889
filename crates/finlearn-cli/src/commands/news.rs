use finlearn_core::{Feature, NewsArticle, NewsClient, Secrets};

use crate::cli::NewsArgs;
use crate::error::CliError;

const NO_STORIES: &str = "No trending stories available at the moment. Check back later!";

pub async fn run(args: &NewsArgs, secrets: &Secrets) -> Result<(), CliError> {
    let client = NewsClient::new(secrets.require(Feature::News)?);
    let articles = client.fetch(&args.query).await;
    println!("{}", render(&articles));
    Ok(())
}

fn render(articles: &[NewsArticle]) -> String {
    if articles.is_empty() {
        return NO_STORIES.to_owned();
    }

    articles
        .iter()
        .map(|article| {
            let mut block = format!(
                "{}\n  Published on: {} UTC",
                article.title,
                article.published_at.format_short()
            );
            if let Some(description) = &article.description {
                block.push_str(&format!("\n  {description}"));
            }
            block.push_str(&format!("\n  Read more: {}", article.url));
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
