//! Data models for the anime catalog scraper
//!
//! Every record is built fresh from a single fetched document. Optional
//! fields are `Option`s that serialize as `null`, so consumers can rely on
//! every key being present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One item block of a listing page (recent, popular, search, genre)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    /// From `.img a img` src
    pub image: Option<String>,
    /// Display name (`.name` text, or the `.name a` title on search pages)
    pub name: Option<String>,
    /// From `.episode`, recent page only
    pub recent_episode_label: Option<String>,
    /// Link to the episode or detail page
    pub detail_link: Option<String>,
    /// Detail page derived from an episode link, recent page only
    pub category_link: Option<String>,
    /// From `.released`, popular/search/genre pages only
    pub release_label: Option<String>,
}

/// A value in the detail page's label/value mapping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InfoValue {
    Text(String),
    Genres(Vec<String>),
}

/// Normalized labels the detail page is known to carry
///
/// The mapping is open: rows with other labels are stored under their
/// normalized key as well.
pub mod info_keys {
    pub const PLOT_SUMMARY: &str = "plot_summary";
    pub const OTHER_NAME: &str = "other_name";
    pub const RELEASED: &str = "released";
    pub const GENRE: &str = "genre";
    pub const STATUS: &str = "status";
    pub const TYPE: &str = "type";
}

/// Full metadata of one title from its detail page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
    /// From `div.anime_info_body_bg img`
    pub image: Option<String>,
    /// From `h1`
    pub title: Option<String>,
    /// Canonical identifier derived from the detail link
    pub slug: String,
    /// Normalized label -> value, `None` when the row had no usable value
    pub info: BTreeMap<String, Option<InfoValue>>,
    /// Site-declared last episode (`ep_end` of the last episode page marker)
    pub episode_count: Option<u32>,
}

impl DetailRecord {
    /// Text value of a row, if present and textual
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.info.get(key) {
            Some(Some(InfoValue::Text(text))) => Some(text),
            _ => None,
        }
    }

    /// Genre names, empty when the page had no genre row
    pub fn genres(&self) -> &[String] {
        match self.info.get(info_keys::GENRE) {
            Some(Some(InfoValue::Genres(genres))) => genres,
            _ => &[],
        }
    }
}

/// A named alternate source for one episode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MirrorLink {
    pub name: String,
    /// Always absolute
    pub url: String,
}

/// Parsed episode page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    /// From `div.anime-info a` title
    pub title: Option<String>,
    pub episode_number: u32,
    /// In page order; may be empty
    pub mirror_links: Vec<MirrorLink>,
}

/// A download link revealed by executing the downloads page script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MirrorDownloadLink {
    pub label: String,
    pub href: String,
}

/// One airing entry of the weekly schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry {
    pub title: Option<String>,
    pub img: Option<String>,
    pub episode: u32,
    pub airing_time: Option<String>,
}

/// Fixed seven-day schedule; every day is present even when empty
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeeklySchedule {
    pub monday: Vec<ScheduleEntry>,
    pub tuesday: Vec<ScheduleEntry>,
    pub wednesday: Vec<ScheduleEntry>,
    pub thursday: Vec<ScheduleEntry>,
    pub friday: Vec<ScheduleEntry>,
    pub saturday: Vec<ScheduleEntry>,
    pub sunday: Vec<ScheduleEntry>,
}

impl WeeklySchedule {
    /// Mutable bucket for a lowercase weekday name
    pub fn day_mut(&mut self, day: &str) -> Option<&mut Vec<ScheduleEntry>> {
        match day {
            "monday" => Some(&mut self.monday),
            "tuesday" => Some(&mut self.tuesday),
            "wednesday" => Some(&mut self.wednesday),
            "thursday" => Some(&mut self.thursday),
            "friday" => Some(&mut self.friday),
            "saturday" => Some(&mut self.saturday),
            "sunday" => Some(&mut self.sunday),
            _ => None,
        }
    }
}
