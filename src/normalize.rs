//! Shared string cleanup for every extractor
//!
//! Slug and link derivation, URL canonicalization, label normalization and
//! argument validation live here so that each rule has exactly one
//! implementation.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use crate::constants::markers;
use crate::error::{ScrapeError, ScrapeResult};

/// Trailing episode segment of an episode link, e.g. `-episode-12` or `-episode-7-5`
#[allow(clippy::expect_used)]
static EPISODE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-episode-\d+(?:-\d+)?$").expect("episode suffix regex is valid")
});

#[allow(clippy::expect_used)]
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Extract slug from a detail link
///
/// `/category/one-piece` becomes `one-piece`. Links that already are a slug
/// come back unchanged, so the derivation is idempotent. A bare
/// `/category/` has no slug and yields an empty string.
pub fn derive_slug(detail_link: &str) -> String {
    let link = detail_link.trim().trim_end_matches('/');
    let slug = match link.rfind(markers::CATEGORY_PREFIX) {
        Some(idx) => &link[idx + markers::CATEGORY_PREFIX.len()..],
        None if link.ends_with(markers::CATEGORY_PREFIX.trim_end_matches('/')) => "",
        None => {
            let link = link.trim_start_matches('/');
            link.strip_prefix("category/").unwrap_or(link)
        }
    };
    slug.to_string()
}

/// Detail page link for an episode link
///
/// `/one-piece-episode-5` becomes `/category/one-piece`. Only a trailing
/// `-episode-<digits>` segment is removed. Absolute links keep only their path.
pub fn derive_category_link(item_link: &str) -> String {
    let link = item_link.trim().trim_end_matches('/');
    let path = match Url::parse(link) {
        Ok(url) => url.path().trim_end_matches('/').to_string(),
        Err(_) => link.to_string(),
    };
    let title = EPISODE_SUFFIX.replace(&path, "");
    format!("{}{}", markers::CATEGORY_PREFIX, title.trim_start_matches('/'))
}

/// Make a mirror URL absolute
///
/// `https` URLs (and explicit `http://` ones) are kept; protocol-relative
/// `//host/path` gets an `https:` scheme.
pub fn normalize_protocol_relative(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("https") || url.starts_with("http://") {
        url.to_string()
    } else if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        format!("https://{}", url.trim_start_matches('/'))
    }
}

/// Remove the label's own markup from an info row's inner HTML
///
/// Only the first occurrence is removed. When the label is not found the
/// row is returned unchanged (trimmed).
pub fn strip_label_markup(row_html: &str, label_html: &str) -> String {
    if label_html.is_empty() {
        return row_html.trim().to_string();
    }
    row_html.replacen(label_html, "", 1).trim().to_string()
}

/// Canonical key for an info row label
///
/// `"Plot Summary: "` becomes `plot_summary`, `"Other name:"` becomes `other_name`.
pub fn normalize_label(label: &str) -> String {
    let key = label.to_lowercase();
    let key = key.trim().trim_end_matches(':');
    WHITESPACE_RUN.replacen(key.trim(), 1, "_").into_owned()
}

/// Mirror link label without the "choose this server" phrase
pub fn clean_mirror_name(text: &str) -> String {
    text.trim().replace(markers::CHOOSE_SERVER, "").trim().to_string()
}

/// Download link label without the "Download" marker and embedded newlines
pub fn clean_download_label(text: &str) -> String {
    text.replace(markers::DOWNLOAD, "")
        .replace(['\n', '\r'], "")
        .trim()
        .to_string()
}

/// Trimmed text, `None` when nothing is left
pub fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Reject a missing or blank required argument
pub fn require<'a>(value: Option<&'a str>, what: &'static str) -> ScrapeResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ScrapeError::MissingArgument(what)),
    }
}

/// Listing page numbers start at 1
pub fn validate_page(page: i64) -> ScrapeResult<u32> {
    if page <= 0 {
        return Err(ScrapeError::InvalidPageNumber(page));
    }
    u32::try_from(page).map_err(|_| ScrapeError::invalid(format!("page {} is out of range", page)))
}

/// Episode numbers must be positive integers
pub fn validate_episode_number(episode: i64) -> ScrapeResult<u32> {
    if episode <= 0 {
        return Err(ScrapeError::invalid(format!(
            "episode number must be a positive integer, got {}",
            episode
        )));
    }
    u32::try_from(episode)
        .map_err(|_| ScrapeError::invalid(format!("episode number {} is out of range", episode)))
}

/// Parse an untyped episode number such as a query parameter
pub fn parse_episode_number(raw: &str) -> ScrapeResult<u32> {
    let raw = require(Some(raw), "Episode number")?;
    let episode: i64 = raw
        .parse()
        .map_err(|_| ScrapeError::invalid(format!("episode needs to be a number, got {:?}", raw)))?;
    validate_episode_number(episode)
}
