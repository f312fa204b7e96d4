//! Minimal Asana API envelopes.

use serde::Deserialize;

/// Paginated list response: `{ "data": [...], "next_page": { "offset": ... } | null }`.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_page: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
pub struct NextPage {
    pub offset: String,
}

/// Single-object response: `{ "data": {...} }`.
#[derive(Debug, Deserialize)]
pub struct Single<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct TaskCompact {
    pub gid: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentCompact {
    pub gid: String,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentFull {
    pub gid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Error response: `{ "errors": [{ "message": "..." }] }`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEntry {
    #[serde(default)]
    pub message: String,
}

/// First API error message in `body`, if it parses as an error envelope.
pub fn error_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed
        .errors
        .into_iter()
        .map(|e| e.message)
        .find(|m| !m.is_empty())
}
