//! Weekly airing schedule
//!
//! Reshapes the third-party schedule API's per-day lists into a fixed
//! seven-day [`WeeklySchedule`], dropping entries without an episode count.

use chrono::Weekday;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ScrapeResult;
use crate::models::{ScheduleEntry, WeeklySchedule};

/// Entry as the schedule API sends it; unknown fields are ignored
#[derive(Debug, Deserialize)]
struct RawScheduleEntry {
    title: Option<String>,
    image_url: Option<String>,
    episodes: Option<u32>,
    airing_start: Option<String>,
}

/// Lowercase English day name used both as API path segment and as key
pub fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Bucket the API payload into a fixed weekly map
///
/// Non-weekday keys (request metadata and the like) are ignored. A payload
/// that is not a JSON object yields an empty week.
pub fn reshape_schedule(payload: &Value) -> ScrapeResult<WeeklySchedule> {
    let mut schedule = WeeklySchedule::default();

    let Some(days) = payload.as_object() else {
        return Ok(schedule);
    };

    for (key, entries) in days {
        let Some(bucket) = schedule.day_mut(key) else {
            continue;
        };

        let raw: Vec<RawScheduleEntry> = serde_json::from_value(entries.clone())?;
        bucket.extend(raw.into_iter().filter_map(|entry| {
            Some(ScheduleEntry {
                episode: entry.episodes?,
                title: entry.title,
                img: entry.image_url,
                airing_time: entry.airing_start,
            })
        }));
    }

    Ok(schedule)
}
