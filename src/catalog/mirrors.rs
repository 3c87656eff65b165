//! Download mirrors hidden behind the episode page's "downloads" link
//!
//! The downloads page only fills in its links after running script, so it is
//! loaded in a rendering session instead of being fetched.

use serde::Deserialize;
use tracing::{info, warn};

use super::{validate_episode_args, Catalog};
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::MirrorDownloadLink;
use crate::normalize::clean_download_label;
use crate::parser::{is_episode_not_found, parse_downloads_link};
use crate::render::{Renderer, WaitUntil};

/// Collects the href and visible text of every `.dowload` block's anchor
pub const DOWNLOAD_LINKS_SCRIPT: &str = r#"
JSON.stringify(Array.from(document.querySelectorAll('.dowload')).map((el) => {
    const link = el.querySelector('a');
    return {
        href: link ? link.getAttribute('href') : null,
        label: link ? link.textContent : null,
    };
}))
"#;

#[derive(Debug, Deserialize)]
struct RawDownloadLink {
    href: Option<String>,
    label: Option<String>,
}

impl Catalog {
    /// Resolve the script-gated download links of one episode
    ///
    /// Two hops: the static episode page yields the downloads link, which is
    /// then rendered and queried in-page.
    pub async fn resolve_download_mirrors(
        &self,
        slug: &str,
        episode: i64,
    ) -> ScrapeResult<Vec<MirrorDownloadLink>> {
        let (slug, episode) = validate_episode_args(slug, episode)?;
        let html = self.fetch_episode_page(slug, episode).await?;

        if is_episode_not_found(&html) {
            return Err(ScrapeError::EpisodeNotFound {
                slug: slug.to_string(),
                episode,
            });
        }

        let downloads_url =
            parse_downloads_link(&html).ok_or(ScrapeError::MissingElement("downloads link"))?;

        extract_download_links(self.renderer.as_ref(), &downloads_url).await
    }
}

/// Render `url` and run [`DOWNLOAD_LINKS_SCRIPT`]; the session is closed on every path
pub(crate) async fn extract_download_links(
    renderer: &dyn Renderer,
    url: &str,
) -> ScrapeResult<Vec<MirrorDownloadLink>> {
    info!("Resolving download mirrors from {}", url);
    let session = renderer.open(url, WaitUntil::NetworkIdle).await?;

    let extracted = session.evaluate(DOWNLOAD_LINKS_SCRIPT).await;
    let closed = session.close().await;

    if let Err(e) = &closed {
        warn!("Rendering session for {} did not close cleanly: {}", url, e);
    }
    let value = extracted?;
    closed?;

    let raw: Vec<RawDownloadLink> = serde_json::from_value(value)?;
    let links: Vec<MirrorDownloadLink> = raw
        .into_iter()
        .filter_map(|link| {
            Some(MirrorDownloadLink {
                href: link.href.filter(|href| !href.trim().is_empty())?,
                label: clean_download_label(link.label.as_deref().unwrap_or_default()),
            })
        })
        .collect();

    tracing::debug!("Resolved {} download mirrors", links.len());
    Ok(links)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::catalog::fakes::{FakeFetcher, FakeRenderer};
    use crate::render::RenderError;

    const EPISODE_PAGE: &str = r#"
    <html><body>
        <div class="anime_muti_link"><ul></ul></div>
        <ul><li class="dowloads"><a href="https://dl.test/download?id=abc" target="_blank">Download</a></li></ul>
    </body></html>
    "#;

    fn catalog(renderer: &Arc<FakeRenderer>, fetcher: FakeFetcher) -> Catalog {
        Catalog::new("https://anime.test", Arc::new(fetcher), renderer.clone())
    }

    #[tokio::test]
    async fn test_resolve_download_mirrors() {
        let renderer = Arc::new(FakeRenderer::returning(json!([
            { "href": "https://cdn.test/360.mp4", "label": "\n  Download\n  (360P - mp4)\n" },
            { "href": "https://cdn.test/720.mp4", "label": "Download (720P - mp4)" },
            { "href": null, "label": "Download (broken)" }
        ])));
        let fetcher = FakeFetcher::new().with_page("https://anime.test/one-piece-episode-5", EPISODE_PAGE);
        let catalog = catalog(&renderer, fetcher);

        let links = catalog.resolve_download_mirrors("one-piece", 5).await.unwrap();

        assert_eq!(
            links,
            vec![
                MirrorDownloadLink {
                    label: "(360P - mp4)".to_string(),
                    href: "https://cdn.test/360.mp4".to_string(),
                },
                MirrorDownloadLink {
                    label: "(720P - mp4)".to_string(),
                    href: "https://cdn.test/720.mp4".to_string(),
                },
            ]
        );
        assert_eq!(
            renderer.urls(),
            vec![("https://dl.test/download?id=abc".to_string(), WaitUntil::NetworkIdle)]
        );
        assert_eq!(renderer.opened(), 1);
        assert_eq!(renderer.closed(), 1);
    }

    #[tokio::test]
    async fn test_session_closed_when_script_fails() {
        let renderer = Arc::new(FakeRenderer::failing("querySelector is not a function"));
        let fetcher = FakeFetcher::new().with_page("https://anime.test/one-piece-episode-5", EPISODE_PAGE);
        let catalog = catalog(&renderer, fetcher);

        let result = catalog.resolve_download_mirrors("one-piece", 5).await;

        assert!(matches!(result, Err(ScrapeError::Render(RenderError::Script(_)))));
        assert_eq!(renderer.closed(), 1);
    }

    #[tokio::test]
    async fn test_close_failure_after_successful_extraction() {
        let renderer = Arc::new(FakeRenderer::returning(json!([])).stuck_on_close("stuck"));
        let fetcher = FakeFetcher::new().with_page("https://anime.test/one-piece-episode-5", EPISODE_PAGE);
        let catalog = catalog(&renderer, fetcher);

        let result = catalog.resolve_download_mirrors("one-piece", 5).await;

        match result {
            Err(ScrapeError::Render(RenderError::Close(message))) => assert_eq!(message, "stuck"),
            other => panic!("expected a close error, got {:?}", other),
        }
        assert_eq!(renderer.closed(), 1);
    }

    #[tokio::test]
    async fn test_script_failure_wins_over_close_failure() {
        let renderer = Arc::new(FakeRenderer::failing("boom").stuck_on_close("stuck"));
        let fetcher = FakeFetcher::new().with_page("https://anime.test/one-piece-episode-5", EPISODE_PAGE);
        let catalog = catalog(&renderer, fetcher);

        let result = catalog.resolve_download_mirrors("one-piece", 5).await;

        match result {
            Err(ScrapeError::Render(RenderError::Script(message))) => assert_eq!(message, "boom"),
            other => panic!("expected a script error, got {:?}", other),
        }
        assert_eq!(renderer.closed(), 1);
    }

    #[tokio::test]
    async fn test_session_closed_when_result_is_malformed() {
        let renderer = Arc::new(FakeRenderer::returning(json!({ "unexpected": true })));
        let fetcher = FakeFetcher::new().with_page("https://anime.test/one-piece-episode-5", EPISODE_PAGE);
        let catalog = catalog(&renderer, fetcher);

        let result = catalog.resolve_download_mirrors("one-piece", 5).await;

        assert!(matches!(result, Err(ScrapeError::Decode(_))));
        assert_eq!(renderer.closed(), 1);
    }

    #[tokio::test]
    async fn test_open_failure_surfaces_render_error() {
        let renderer = Arc::new(FakeRenderer::unable_to_open());
        let fetcher = FakeFetcher::new().with_page("https://anime.test/one-piece-episode-5", EPISODE_PAGE);
        let catalog = catalog(&renderer, fetcher);

        let result = catalog.resolve_download_mirrors("one-piece", 5).await;

        assert!(matches!(result, Err(ScrapeError::Render(RenderError::Launch(_)))));
        assert_eq!(renderer.opened(), 0);
        assert_eq!(renderer.closed(), 0);
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_touch_network_or_renderer() {
        let renderer = Arc::new(FakeRenderer::returning(json!([])));
        let fetcher = Arc::new(FakeFetcher::new());
        let catalog = Catalog::new("https://anime.test", fetcher.clone(), renderer.clone());

        assert!(matches!(
            catalog.resolve_download_mirrors("one-piece", -3).await,
            Err(ScrapeError::InvalidArgument(_))
        ));
        assert!(matches!(
            catalog.resolve_download_mirrors("", 1).await,
            Err(ScrapeError::MissingArgument(_))
        ));
        assert!(fetcher.requests().is_empty());
        assert!(renderer.urls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_downloads_link() {
        let renderer = Arc::new(FakeRenderer::returning(json!([])));
        let fetcher = FakeFetcher::new()
            .with_page("https://anime.test/one-piece-episode-5", "<html><body></body></html>");
        let catalog = catalog(&renderer, fetcher);

        assert!(matches!(
            catalog.resolve_download_mirrors("one-piece", 5).await,
            Err(ScrapeError::MissingElement(_))
        ));
        assert_eq!(renderer.opened(), 0);
    }

    #[tokio::test]
    async fn test_not_found_episode_is_not_rendered() {
        let renderer = Arc::new(FakeRenderer::returning(json!([])));
        let page = EPISODE_PAGE.replace("<body>", r#"<body><h1 class="entry-title">404</h1>"#);
        let fetcher = FakeFetcher::new().with_page("https://anime.test/one-piece-episode-5", &page);
        let catalog = catalog(&renderer, fetcher);

        assert!(matches!(
            catalog.resolve_download_mirrors("one-piece", 5).await,
            Err(ScrapeError::EpisodeNotFound { .. })
        ));
        assert_eq!(renderer.opened(), 0);
    }
}
