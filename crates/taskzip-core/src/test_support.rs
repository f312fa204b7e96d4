//! In-memory catalog and fetcher used by unit tests.

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::catalog::{CatalogClient, CatalogError};
use crate::fetch::{FetchError, Fetcher};
use crate::model::{AttachmentDetail, AttachmentRef, Item};

fn api_error(status: u32) -> CatalogError {
    CatalogError::Status {
        status,
        message: "simulated".to_string(),
    }
}

/// Catalog backed by maps; unknown ids answer 404.
#[derive(Default)]
pub struct FakeCatalog {
    items: HashMap<String, Vec<Item>>,
    children: HashMap<String, Result<Vec<String>, u32>>,
    details: HashMap<String, Result<AttachmentDetail, u32>>,
    pub detail_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, collection: &str, id: &str, name: &str) -> Self {
        self.items
            .entry(collection.to_string())
            .or_default()
            .push(Item {
                id: id.to_string(),
                name: name.to_string(),
            });
        self
    }

    pub fn with_children(mut self, item_id: &str, child_ids: &[&str]) -> Self {
        self.children.insert(
            item_id.to_string(),
            Ok(child_ids.iter().map(|c| c.to_string()).collect()),
        );
        self
    }

    pub fn with_failing_children(mut self, item_id: &str) -> Self {
        self.children.insert(item_id.to_string(), Err(500));
        self
    }

    pub fn with_detail(mut self, child_id: &str, name: &str, url: &str) -> Self {
        self.details.insert(
            child_id.to_string(),
            Ok(AttachmentDetail {
                name: name.to_string(),
                url: url.to_string(),
            }),
        );
        self
    }

    pub fn with_failing_detail(mut self, child_id: &str) -> Self {
        self.details.insert(child_id.to_string(), Err(403));
        self
    }
}

impl CatalogClient for FakeCatalog {
    fn list_items(&self, collection_id: &str) -> Result<Vec<Item>, CatalogError> {
        self.items
            .get(collection_id)
            .cloned()
            .ok_or_else(|| api_error(404))
    }

    fn list_children(&self, item_id: &str) -> Result<Vec<AttachmentRef>, CatalogError> {
        match self.children.get(item_id) {
            Some(Ok(ids)) => Ok(ids
                .iter()
                .map(|id| AttachmentRef {
                    id: id.clone(),
                    item_id: item_id.to_string(),
                })
                .collect()),
            Some(Err(status)) => Err(api_error(*status)),
            None => Ok(Vec::new()),
        }
    }

    fn get_detail(&self, child_id: &str) -> Result<AttachmentDetail, CatalogError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        match self.details.get(child_id) {
            Some(Ok(d)) => Ok(d.clone()),
            Some(Err(status)) => Err(api_error(*status)),
            None => Err(api_error(404)),
        }
    }
}

/// Response served by [`FakeFetcher`] for one URL.
#[derive(Clone)]
pub enum FakeResponse {
    Body(Vec<u8>),
    /// Writes the given bytes and then fails, like a dropped connection.
    Truncated(Vec<u8>),
    Status(u32),
}

/// Fetcher backed by a URL map; unknown URLs answer 404.
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, FakeResponse>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
        self.responses
            .insert(url.to_string(), FakeResponse::Body(body.to_vec()));
        self
    }

    pub fn with_response(mut self, url: &str, response: FakeResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// Sleep per chunk so concurrent jobs overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let result = self.serve(url, sink);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl FakeFetcher {
    fn serve(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError> {
        let response = self
            .responses
            .get(url)
            .cloned()
            .unwrap_or(FakeResponse::Status(404));
        let (body, fail_after) = match response {
            FakeResponse::Status(code) => return Err(FetchError::Status(code)),
            FakeResponse::Body(b) => (b, false),
            FakeResponse::Truncated(b) => (b, true),
        };
        let mut written = 0u64;
        for chunk in body.chunks(7) {
            if let Some(d) = self.delay {
                std::thread::sleep(d);
            }
            sink.write_all(chunk).map_err(FetchError::Storage)?;
            written += chunk.len() as u64;
        }
        if fail_after {
            // CURLE_RECV_ERROR
            return Err(FetchError::Transport(curl::Error::new(56)));
        }
        Ok(written)
    }
}
