//! Constants module for the anime catalog scraper
//!
//! Contains endpoint URL builders that use the base URL from configuration,
//! plus the fixed strings the site uses as markers in its markup.

/// URL builder functions for all endpoints
pub mod endpoints {
    /// Home page, which also carries the genre navigation block
    pub fn home(base_url: &str) -> String {
        base_url.to_string()
    }

    /// Recently released episodes
    pub fn recent(base_url: &str, page: u32) -> String {
        format!("{}/?page={}", base_url, page)
    }

    /// Popular titles
    pub fn popular(base_url: &str, page: u32) -> String {
        format!("{}/popular.html?page={}", base_url, page)
    }

    /// Search URL with keyword parameter
    pub fn search(base_url: &str, keyword: &str) -> String {
        format!(
            "{}/search.html?keyword={}",
            base_url,
            urlencoding::encode(keyword)
        )
    }

    /// Titles tagged with a genre; the genre path segment is lower-cased
    pub fn genre(base_url: &str, name: &str, page: u32) -> String {
        format!(
            "{}/genre/{}?page={}",
            base_url,
            urlencoding::encode(&name.to_lowercase()),
            page
        )
    }

    /// Detail page for a site-relative detail link such as `/category/one-piece`
    pub fn detail(base_url: &str, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else if link.starts_with('/') {
            format!("{}{}", base_url, link)
        } else {
            format!("{}/{}", base_url, link)
        }
    }

    /// Episode page URL
    pub fn episode(base_url: &str, slug: &str, episode: u32) -> String {
        format!("{}/{}-episode-{}", base_url, slug, episode)
    }

    /// Weekly schedule API, optionally narrowed to one day
    pub fn schedule(schedule_url: &str, day: &str) -> String {
        format!("{}{}", schedule_url, day)
    }
}

/// Fixed strings the site embeds in its markup
pub mod markers {
    /// Path prefix of every detail page
    pub const CATEGORY_PREFIX: &str = "/category/";

    /// Text the search page renders inside the result list when nothing matched
    pub const SEARCH_NOT_FOUND: &str = "Sorry, Not found";

    /// Heading text of a missing episode page
    pub const EPISODE_NOT_FOUND_HEADING: &str = "404";

    /// Phrase appended to every mirror link label
    pub const CHOOSE_SERVER: &str = "Choose this server";

    /// Marker prefixed to every download link label
    pub const DOWNLOAD: &str = "Download";

    /// Label prefix on search result release years
    pub const RELEASED_LABEL: &str = "Released:";
}
