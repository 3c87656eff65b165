//! In-memory collaborators for exercising `Catalog` without a network or browser

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::render::{RenderError, RenderSession, Renderer, WaitUntil};
use crate::scraper::{FetchError, Fetcher};

/// Serves canned pages; unknown URLs answer HTTP 404
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or(FetchError::HttpError(404))
    }
}

/// Opens sessions whose script evaluation returns a canned outcome
pub struct FakeRenderer {
    outcome: Result<Value, String>,
    fail_open: bool,
    close_failure: Option<String>,
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
    urls: Mutex<Vec<(String, WaitUntil)>>,
}

impl FakeRenderer {
    pub fn returning(value: Value) -> Self {
        Self::with_outcome(Ok(value))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_outcome(Err(message.to_string()))
    }

    pub fn unable_to_open() -> Self {
        Self {
            fail_open: true,
            ..Self::with_outcome(Ok(Value::Null))
        }
    }

    /// Sessions from this renderer fail to close with `message`
    pub fn stuck_on_close(mut self, message: &str) -> Self {
        self.close_failure = Some(message.to_string());
        self
    }

    fn with_outcome(outcome: Result<Value, String>) -> Self {
        Self {
            outcome,
            fail_open: false,
            close_failure: None,
            opened: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<(String, WaitUntil)> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn open(
        &self,
        url: &str,
        wait_until: WaitUntil,
    ) -> Result<Box<dyn RenderSession>, RenderError> {
        self.urls.lock().unwrap().push((url.to_string(), wait_until));
        if self.fail_open {
            return Err(RenderError::Launch("no browser".to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            outcome: self.outcome.clone(),
            close_failure: self.close_failure.clone(),
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct FakeSession {
    outcome: Result<Value, String>,
    close_failure: Option<String>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn evaluate(&self, _script: &str) -> Result<Value, RenderError> {
        self.outcome.clone().map_err(RenderError::Script)
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        match self.close_failure {
            Some(message) => Err(RenderError::Close(message)),
            None => Ok(()),
        }
    }
}
