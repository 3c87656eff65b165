//! Parser module for extracting structured data from HTML
//!
//! Every function here is pure: it takes an already fetched document and
//! returns typed records. Missing sub-elements degrade to `None` for that
//! field; only the site's own "not found" conventions are errors.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};

use crate::constants::markers;
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{
    info_keys, DetailRecord, EpisodeRecord, InfoValue, ListingEntry, MirrorLink,
};
use crate::normalize::{
    clean_mirror_name, derive_category_link, derive_slug, non_empty, normalize_label,
    normalize_protocol_relative, strip_label_markup,
};

/// Which listing page a document came from; decides the field set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    /// Recently released episodes: carries the episode label and a derived category link
    Recent,
    /// Popular titles: carries a release label
    Popular,
    /// Titles of one genre: same shape as popular
    Genre,
    /// Search results: name and link come from the `.name a` anchor
    Search,
}

impl ListingKind {
    fn item_selector(self) -> &'static str {
        match self {
            ListingKind::Search => "div.last_episodes ul.items > li",
            _ => ".items > li",
        }
    }
}

#[allow(clippy::expect_used)]
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector is valid")
}

fn first<'a>(el: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    el.select(selector).next()
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

fn attr_of(el: Option<ElementRef<'_>>, name: &str) -> Option<String> {
    el.and_then(|el| el.value().attr(name)).and_then(non_empty)
}

/// Parse the item blocks of a listing page, in document order
///
/// Each `li` yields exactly one entry; absent fields are `None`.
pub fn parse_listing(html: &str, kind: ListingKind) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);

    let item_selector = selector(kind.item_selector());
    let image_selector = selector(".img a img");
    let image_link_selector = selector(".img a");
    let name_selector = selector(".name");
    let name_link_selector = selector(".name a");
    let episode_selector = selector(".episode");
    let released_selector = selector(".released");

    let mut entries = Vec::new();

    for item in document.select(&item_selector) {
        let image = attr_of(first(item, &image_selector), "src");
        let name_el = first(item, &name_selector);
        let name_link = first(item, &name_link_selector);

        let (name, detail_link) = match kind {
            ListingKind::Search => (
                attr_of(name_link, "title").or_else(|| name_el.map(text_of).and_then(|t| non_empty(&t))),
                attr_of(name_link, "href"),
            ),
            _ => (
                name_el.map(text_of).and_then(|t| non_empty(&t)),
                attr_of(first(item, &image_link_selector), "href"),
            ),
        };

        let mut entry = ListingEntry {
            image,
            name,
            ..ListingEntry::default()
        };

        match kind {
            ListingKind::Recent => {
                entry.recent_episode_label = first(item, &episode_selector)
                    .map(text_of)
                    .and_then(|t| non_empty(&t));
                entry.category_link = detail_link.as_deref().map(derive_category_link);
            }
            ListingKind::Popular | ListingKind::Genre | ListingKind::Search => {
                entry.release_label = first(item, &released_selector)
                    .map(text_of)
                    .and_then(|t| non_empty(&t.replace(markers::RELEASED_LABEL, "")));
            }
        }

        entry.detail_link = detail_link;
        entries.push(entry);
    }

    tracing::debug!("Parsed {} {:?} listing entries", entries.len(), kind);
    entries
}

/// Parse a search results page
///
/// Fails with [`ScrapeError::NotFound`] when the result list carries the
/// site's "Sorry, Not found" marker. A page without the marker and without
/// items yields an empty vector.
pub fn parse_search_results(html: &str, keyword: &str) -> ScrapeResult<Vec<ListingEntry>> {
    if search_not_found(html) {
        return Err(ScrapeError::not_found(format!("no anime matches {:?}", keyword)));
    }
    Ok(parse_listing(html, ListingKind::Search))
}

fn search_not_found(html: &str) -> bool {
    let document = Html::parse_document(html);
    let list_selector = selector("ul.items");

    document
        .select(&list_selector)
        .any(|list| text_of(list).contains(markers::SEARCH_NOT_FOUND))
}

/// Genre names from the home page's genre navigation block
pub fn parse_genre_names(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let item_selector = selector("nav.menu_series.genre.right ul li");
    let link_selector = selector("a");

    document
        .select(&item_selector)
        .filter_map(|li| {
            let link = first(li, &link_selector)?;
            attr_of(Some(link), "title").or_else(|| non_empty(&text_of(link)))
        })
        .collect()
}

/// Parse a title's detail page
///
/// `detail_link` is the link the page was fetched from; the slug is derived
/// from it rather than from the markup.
pub fn parse_detail(html: &str, detail_link: &str) -> DetailRecord {
    let document = Html::parse_document(html);

    let image_selector = selector("div.anime_info_body_bg img");
    let title_selector = selector("h1");
    let row_selector = selector("div.anime_info_body p.type");
    let label_selector = selector("span");
    let link_selector = selector("a");
    let episode_page_selector = selector("ul#episode_page li");

    let image = attr_of(document.select(&image_selector).next(), "src");

    let title = document
        .select(&title_selector)
        .next()
        .map(text_of)
        .and_then(|t| non_empty(&t));

    let mut info = BTreeMap::new();

    for row in document.select(&row_selector) {
        let Some(label) = first(row, &label_selector) else {
            tracing::debug!("Skipping info row without a label");
            continue;
        };

        let key = normalize_label(&text_of(label));
        if key.is_empty() {
            continue;
        }

        let value = if is_free_text_key(&key) {
            let rest = strip_label_markup(&row.inner_html(), &label.html());
            let fragment = Html::parse_fragment(&rest);
            non_empty(&text_of(fragment.root_element())).map(InfoValue::Text)
        } else if key.contains(info_keys::GENRE) {
            let genres: Vec<String> = row
                .select(&link_selector)
                .filter_map(|a| attr_of(Some(a), "title"))
                .collect();
            if genres.is_empty() {
                None
            } else {
                Some(InfoValue::Genres(genres))
            }
        } else {
            let text: String = row.select(&link_selector).map(text_of).collect();
            non_empty(&text).map(InfoValue::Text)
        };

        info.insert(key, value);
    }

    let episode_count = document
        .select(&episode_page_selector)
        .last()
        .and_then(|li| attr_of(first(li, &link_selector), "ep_end"))
        .and_then(|end| end.parse::<u32>().ok());

    DetailRecord {
        image,
        title,
        slug: derive_slug(detail_link),
        info,
        episode_count,
    }
}

/// Rows whose value is free text rather than links
fn is_free_text_key(key: &str) -> bool {
    [info_keys::PLOT_SUMMARY, info_keys::RELEASED, info_keys::OTHER_NAME]
        .iter()
        .any(|known| key.contains(known))
}

fn is_not_found_page(document: &Html) -> bool {
    let heading_selector = selector("h1.entry-title");
    document
        .select(&heading_selector)
        .next()
        .map(|h1| text_of(h1).trim() == markers::EPISODE_NOT_FOUND_HEADING)
        .unwrap_or(false)
}

/// Parse an episode page
///
/// The 404 heading is checked before anything else, so a not-found page
/// fails even if it also carries mirror markup.
pub fn parse_episode(html: &str, slug: &str, episode: u32) -> ScrapeResult<EpisodeRecord> {
    let document = Html::parse_document(html);

    if is_not_found_page(&document) {
        return Err(ScrapeError::EpisodeNotFound {
            slug: slug.to_string(),
            episode,
        });
    }

    let mirror_selector = selector("div.anime_muti_link ul li");
    let link_selector = selector("a");
    let title_selector = selector("div.anime-info a");

    let mut mirror_links = Vec::new();

    for li in document.select(&mirror_selector) {
        let Some(link) = first(li, &link_selector) else {
            continue;
        };
        let Some(video) = attr_of(Some(link), "data-video") else {
            tracing::debug!("Skipping mirror without data-video");
            continue;
        };

        mirror_links.push(MirrorLink {
            name: clean_mirror_name(&text_of(link)),
            url: normalize_protocol_relative(&video),
        });
    }

    let title = attr_of(document.select(&title_selector).next(), "title");

    Ok(EpisodeRecord {
        title,
        episode_number: episode,
        mirror_links,
    })
}

/// Href of the episode page's "downloads" entry
pub fn parse_downloads_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let downloads_selector = selector("li.dowloads a");
    attr_of(document.select(&downloads_selector).next(), "href")
}

/// True when an episode page uses the site's 404 heading
pub fn is_episode_not_found(html: &str) -> bool {
    is_not_found_page(&Html::parse_document(html))
}
