use std::env;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wxcrawl_rs::{Article, KeywordQuery, WxCrawlClient, WxCrawlConfig};

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <command> [args]", program);
    eprintln!("  search  <query>                          search public accounts");
    eprintln!("  latest  <nickname> [count]               newest articles of an account");
    eprintln!("  extract <article_url>                    article body as markdown");
    eprintln!("  keyword <keyword> <nickname> [count] [offset]");
    eprintln!();
    eprintln!("Credentials are read from WXCRAWL_API_KEY and WXCRAWL_API_SECRET;");
    eprintln!("WXCRAWL_BASE_URL overrides the service host.");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wxcrawl_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage(&args[0]);
    }

    let config = WxCrawlConfig::from_env().context("Failed to load credentials")?;
    let client = WxCrawlClient::with_config(config)?;

    match args[1].as_str() {
        "search" => {
            let query = args.get(2).unwrap_or_else(|| usage(&args[0]));
            let accounts = client.search_accounts(query).await?;
            println!("Found {} account(s)", accounts.len());
            for account in &accounts {
                println!("\n{}", account.name);
                if let Some(alias) = &account.alias {
                    println!("  Alias: {}", alias);
                }
                if let Some(description) = &account.description {
                    println!("  About: {}", description);
                }
            }
        }
        "latest" => {
            let nickname = args.get(2).unwrap_or_else(|| usage(&args[0]));
            let count = parse_or(&args, 3, 10);
            let articles = client.latest_articles(nickname, count).await?;
            println!("Found {} article(s)", articles.len());
            print_articles(&articles);
        }
        "extract" => {
            let url = args.get(2).unwrap_or_else(|| usage(&args[0]));
            let markdown = client.extract_article(url).await?;
            println!("{}", markdown);
        }
        "keyword" => {
            let keyword = args.get(2).unwrap_or_else(|| usage(&args[0]));
            let nickname = args.get(3).unwrap_or_else(|| usage(&args[0]));
            let query = KeywordQuery::new(keyword, nickname)
                .count(parse_or(&args, 4, 10))
                .offset(parse_or(&args, 5, 0));

            let result = client.keyword_search(&query).await?;
            match result.total {
                Some(total) => println!(
                    "Found {} article(s) of {} total",
                    result.articles.len(),
                    total
                ),
                None => println!("Found {} article(s)", result.articles.len()),
            }
            print_articles(&result.articles);
        }
        other => {
            eprintln!("Unknown command: {}", other);
            usage(&args[0]);
        }
    }

    Ok(())
}

fn parse_or(args: &[String], index: usize, default: u32) -> u32 {
    args.get(index)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn print_articles(articles: &[Article]) {
    for article in articles {
        println!("\n{}", article.title.as_deref().unwrap_or("(untitled)"));
        if let Some(link) = &article.link {
            println!("  Link: {}", link);
        }
        if let Some(published) = article.published_at() {
            println!("  Published: {}", published.format("%Y-%m-%d %H:%M"));
        }
        if let Some(digest) = &article.digest {
            let preview: String = digest.chars().take(80).collect();
            println!("  Digest: {}", preview);
        }
    }
}
