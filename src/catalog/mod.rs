//! Public entry points of the catalog scraper
//!
//! [`Catalog`] validates arguments, fetches one document through its
//! [`Fetcher`] and hands it to the pure parsers. It holds no per-call state,
//! so one instance can serve concurrent callers.

mod mirrors;

#[cfg(test)]
pub(crate) mod fakes;

pub use mirrors::DOWNLOAD_LINKS_SCRIPT;

use std::sync::Arc;

use chrono::Weekday;
use tracing::info;

use crate::config::Config;
use crate::constants::endpoints;
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{DetailRecord, EpisodeRecord, ListingEntry, WeeklySchedule};
use crate::normalize::{require, validate_episode_number, validate_page};
use crate::parser::{
    parse_detail, parse_episode, parse_genre_names, parse_listing, parse_search_results,
    ListingKind,
};
use crate::render::{ChromeRenderer, Renderer};
use crate::schedule::{reshape_schedule, weekday_key};
use crate::scraper::{FetchError, Fetcher, Scraper};

/// Scraper facade over one catalog site
pub struct Catalog {
    base_url: String,
    schedule_url: String,
    fetcher: Arc<dyn Fetcher>,
    renderer: Arc<dyn Renderer>,
}

impl Catalog {
    /// Create a catalog over `base_url` with explicit collaborators
    pub fn new(
        base_url: impl Into<String>,
        fetcher: Arc<dyn Fetcher>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            schedule_url: Config::default().schedule_url,
            fetcher,
            renderer,
        }
    }

    /// Production wiring: `reqwest` fetcher and headless Chrome renderer
    pub fn from_config(config: &Config) -> ScrapeResult<Self> {
        let fetcher = Scraper::with_config(config.scraper_config())?;
        let renderer = ChromeRenderer::new(config.browser_config());

        Ok(Self::new(config.base_url.clone(), Arc::new(fetcher), Arc::new(renderer))
            .with_schedule_url(config.schedule_url.clone()))
    }

    /// Override the schedule API base URL
    pub fn with_schedule_url(mut self, schedule_url: impl Into<String>) -> Self {
        self.schedule_url = schedule_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, url: &str) -> ScrapeResult<String> {
        info!("Fetching URL: {}", url);
        let html = self.fetcher.fetch_html(url).await?;
        tracing::debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }

    /// Fetch any listing page and parse it with the rules of `kind`
    pub async fn list_from_url(
        &self,
        page_url: &str,
        kind: ListingKind,
    ) -> ScrapeResult<Vec<ListingEntry>> {
        let html = self.fetch(page_url).await?;
        match kind {
            ListingKind::Search => parse_search_results(&html, page_url),
            _ => Ok(parse_listing(&html, kind)),
        }
    }

    /// Recently released episodes
    pub async fn recent(&self, page: i64) -> ScrapeResult<Vec<ListingEntry>> {
        let page = validate_page(page)?;
        self.list_from_url(&endpoints::recent(&self.base_url, page), ListingKind::Recent)
            .await
    }

    /// Popular titles
    pub async fn popular(&self, page: i64) -> ScrapeResult<Vec<ListingEntry>> {
        let page = validate_page(page)?;
        self.list_from_url(&endpoints::popular(&self.base_url, page), ListingKind::Popular)
            .await
    }

    /// Search titles by name
    ///
    /// Fails with [`ScrapeError::NotFound`] when the site reports no match.
    pub async fn search(&self, name: &str) -> ScrapeResult<Vec<ListingEntry>> {
        let name = require(Some(name), "Anime name")?;
        let html = self.fetch(&endpoints::search(&self.base_url, name)).await?;
        parse_search_results(&html, name)
    }

    /// Titles of one genre; the name is lower-cased for the URL
    pub async fn by_genre(&self, name: &str, page: i64) -> ScrapeResult<Vec<ListingEntry>> {
        let name = require(Some(name), "Genre name")?;
        let page = validate_page(page)?;
        self.list_from_url(&endpoints::genre(&self.base_url, name, page), ListingKind::Genre)
            .await
    }

    /// Every genre name from the site's navigation
    pub async fn list_all_genres(&self) -> ScrapeResult<Vec<String>> {
        let html = self.fetch(&endpoints::home(&self.base_url)).await?;
        Ok(parse_genre_names(&html))
    }

    /// Full metadata of the title behind `detail_link` (e.g. `/category/one-piece`)
    pub async fn detail_from_url(&self, detail_link: &str) -> ScrapeResult<DetailRecord> {
        let detail_link = require(Some(detail_link), "Detail link")?;
        let html = self
            .fetch(&endpoints::detail(&self.base_url, detail_link))
            .await?;
        Ok(parse_detail(&html, detail_link))
    }

    /// Episode page with its mirror links
    pub async fn episode(&self, slug: &str, episode: i64) -> ScrapeResult<EpisodeRecord> {
        let (slug, episode) = validate_episode_args(slug, episode)?;
        let html = self.fetch_episode_page(slug, episode).await?;
        parse_episode(&html, slug, episode)
    }

    /// Weekly airing schedule, optionally for a single day
    pub async fn schedule(&self, day: Option<Weekday>) -> ScrapeResult<WeeklySchedule> {
        let day = day.map(weekday_key).unwrap_or_default();
        let body = self
            .fetch(&endpoints::schedule(&self.schedule_url, day))
            .await?;
        let payload: serde_json::Value = serde_json::from_str(&body)?;
        reshape_schedule(&payload)
    }

    /// Fetch an episode page; the server's own 404 counts as a missing episode
    pub(crate) async fn fetch_episode_page(&self, slug: &str, episode: u32) -> ScrapeResult<String> {
        match self
            .fetch(&endpoints::episode(&self.base_url, slug, episode))
            .await
        {
            Err(ScrapeError::Fetch(FetchError::HttpError(404))) => Err(ScrapeError::EpisodeNotFound {
                slug: slug.to_string(),
                episode,
            }),
            other => other,
        }
    }
}

/// Episode number first, then slug; both before any network call
pub(crate) fn validate_episode_args(slug: &str, episode: i64) -> ScrapeResult<(&str, u32)> {
    let episode = validate_episode_number(episode)?;
    let slug = require(Some(slug), "Slug")?;
    Ok((slug, episode))
}
