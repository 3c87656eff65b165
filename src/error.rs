//! Global error handling module for the anime catalog scraper
//!
//! This module provides a unified error type for every public operation.
//! Argument validation failures, the site's own "not found" conventions and
//! transport/rendering failures are all surfaced here instead of being logged
//! and swallowed.

use thiserror::Error;

use crate::render::RenderError;
use crate::scraper::FetchError;

/// Application-wide error type that unifies all error sources
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A required argument (slug, name, link) was omitted
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    /// An argument was present but malformed or out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Listing page numbers start at 1
    #[error("Invalid page number {0}: page cannot be less than 1")]
    InvalidPageNumber(i64),

    /// The search page carried the site's explicit "not found" marker
    #[error("Not found: {0}")]
    NotFound(String),

    /// The episode page used the site's 404 heading convention
    #[error("No such episode found: {slug} episode {episode}")]
    EpisodeNotFound { slug: String, episode: u32 },

    /// A page was fetched but a structurally required element is absent
    #[error("Missing element: {0}")]
    MissingElement(&'static str),

    /// Document fetcher failures (network, HTTP, body)
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Rendering session failures
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// JSON payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Create an invalid argument error
    pub fn invalid(msg: impl Into<String>) -> Self {
        ScrapeError::InvalidArgument(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        ScrapeError::NotFound(msg.into())
    }

    /// True when the failure was caused by the caller's input and no I/O was attempted
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ScrapeError::MissingArgument(_)
                | ScrapeError::InvalidArgument(_)
                | ScrapeError::InvalidPageNumber(_)
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ScrapeError::MissingArgument(what) => format!("{} not provided", what),
            ScrapeError::InvalidArgument(msg) => msg.clone(),
            ScrapeError::InvalidPageNumber(_) => "Page cannot be less than 1".to_string(),
            ScrapeError::NotFound(msg) => msg.clone(),
            ScrapeError::EpisodeNotFound { .. } => "No such episode found!".to_string(),
            ScrapeError::MissingElement(what) => format!("Page is missing {}", what),

            ScrapeError::Fetch(fetch_err) => match fetch_err {
                FetchError::NetworkError(msg) => format!("Failed to connect to server: {}", msg),
                FetchError::HttpError(status) => {
                    format!("Server returned error status: {}", status)
                }
                FetchError::ResponseError(msg) => format!("Failed to read response: {}", msg),
                FetchError::ClientBuild(_) => "HTTP client could not be created".to_string(),
            },

            ScrapeError::Render(_) => "Failed to render the downloads page".to_string(),
            ScrapeError::Decode(_) => "Received malformed data".to_string(),
        }
    }
}

/// Result type alias for operations that can fail with ScrapeError
pub type ScrapeResult<T> = Result<T, ScrapeError>;
