//! Anime catalog lookup
//!
//! Runs a single catalog operation and prints the result as JSON:
//!
//! ```text
//! anime-catalog recent [page]
//! anime-catalog popular [page]
//! anime-catalog search <name>
//! anime-catalog genres
//! anime-catalog genre <name> [page]
//! anime-catalog detail </category/slug>
//! anime-catalog episode <slug> <number>
//! anime-catalog downloads <slug> <number>
//! anime-catalog schedule [day]
//! ```

use std::process::ExitCode;

use chrono::Weekday;
use serde::Serialize;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anime_catalog::catalog::Catalog;
use anime_catalog::config::Config;
use anime_catalog::error::{ScrapeError, ScrapeResult};
use anime_catalog::normalize::parse_episode_number;

fn print_json<T: Serialize>(value: &T) -> ScrapeResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn page_arg(arg: Option<&String>) -> ScrapeResult<i64> {
    match arg {
        None => Ok(1),
        Some(raw) => raw
            .parse()
            .map_err(|_| ScrapeError::invalid(format!("page needs to be a number, got {:?}", raw))),
    }
}

fn arg(args: &[String], i: usize) -> &str {
    args.get(i).map(String::as_str).unwrap_or_default()
}

async fn run(catalog: &Catalog, args: &[String]) -> ScrapeResult<()> {
    let command = args.first().map(String::as_str).unwrap_or("recent");

    match command {
        "recent" => print_json(&catalog.recent(page_arg(args.get(1))?).await?),
        "popular" => print_json(&catalog.popular(page_arg(args.get(1))?).await?),
        "search" => print_json(&catalog.search(arg(args, 1)).await?),
        "genres" => print_json(&catalog.list_all_genres().await?),
        "genre" => print_json(&catalog.by_genre(arg(args, 1), page_arg(args.get(2))?).await?),
        "detail" => print_json(&catalog.detail_from_url(arg(args, 1)).await?),
        "episode" => {
            let episode = parse_episode_number(arg(args, 2))?;
            print_json(&catalog.episode(arg(args, 1), episode.into()).await?)
        }
        "downloads" => {
            let episode = parse_episode_number(arg(args, 2))?;
            print_json(&catalog.resolve_download_mirrors(arg(args, 1), episode.into()).await?)
        }
        "schedule" => {
            let day = match args.get(1) {
                Some(raw) => Some(
                    raw.parse::<Weekday>()
                        .map_err(|_| ScrapeError::invalid(format!("unknown day {:?}", raw)))?,
                ),
                None => None,
            };
            print_json(&catalog.schedule(day).await?)
        }
        other => Err(ScrapeError::invalid(format!("unknown command {:?}", other))),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let result = match Catalog::from_config(&config) {
        Ok(catalog) => run(&catalog, &args).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
