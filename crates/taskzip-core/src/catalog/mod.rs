//! Remote catalog: the three read operations the pipeline needs.
//!
//! The resolver and orchestrator only depend on [`CatalogClient`]; the Asana
//! REST implementation lives in [`AsanaClient`]. Tests substitute in-memory fakes.

mod asana;
mod http;
mod parse;

pub use asana::{AsanaClient, AsanaClientOptions};

use crate::model::{AttachmentDetail, AttachmentRef, Item};

/// Error from a single catalog query. Always recoverable at the pipeline level.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Network failure, timeout, or curl setup error.
    #[error("catalog request failed: {0}")]
    Transport(#[from] curl::Error),
    /// Non-2xx response; `message` is the API's error text when it sent one.
    #[error("catalog returned HTTP {status}: {message}")]
    Status { status: u32, message: String },
    /// Response body was not the expected JSON shape.
    #[error("malformed catalog response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Request URL could not be built from the base URL and identifiers.
    #[error("invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
    /// Attachment exists but has nothing to download (e.g. an external link).
    #[error("attachment {0} has no download URL")]
    NoDownloadUrl(String),
}

/// Read-only view of the remote collection.
///
/// Implementations must be safe to call from many worker threads at once.
pub trait CatalogClient: Send + Sync {
    /// All items (tasks) in a collection (project), across every page.
    fn list_items(&self, collection_id: &str) -> Result<Vec<Item>, CatalogError>;

    /// Attachment references of one item, across every page.
    fn list_children(&self, item_id: &str) -> Result<Vec<AttachmentRef>, CatalogError>;

    /// Downloadable detail (name + URL) of one attachment.
    fn get_detail(&self, child_id: &str) -> Result<AttachmentDetail, CatalogError>;
}
