//! Anime Catalog Scraper Library
//!
//! This library extracts structured metadata about episodic anime from a
//! catalog site that only exposes rendered HTML, and resolves per-episode
//! download mirrors that require executing page script.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod schedule;
pub mod scraper;

pub use catalog::Catalog;
pub use error::{ScrapeError, ScrapeResult};
