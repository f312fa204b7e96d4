//! Asana REST implementation of [`CatalogClient`].

use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::http::{get_json_body, HttpSettings};
use super::parse::{AttachmentCompact, AttachmentFull, Page, Single, TaskCompact};
use super::{CatalogClient, CatalogError};
use crate::config::TaskzipConfig;
use crate::model::{AttachmentDetail, AttachmentRef, Item};
use crate::naming::synthetic_task_name;

/// Settings for [`AsanaClient`].
#[derive(Debug, Clone)]
pub struct AsanaClientOptions {
    /// API root, e.g. `https://app.asana.com/api/1.0`.
    pub base_url: String,
    /// Personal access token or OAuth bearer token.
    pub token: String,
    pub page_size: u32,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl AsanaClientOptions {
    pub fn from_config(cfg: &TaskzipConfig, token: impl Into<String>) -> Self {
        Self {
            base_url: cfg.api_base_url.clone(),
            token: token.into(),
            page_size: cfg.page_size.clamp(1, 100),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs.max(1)),
            request_timeout: Duration::from_secs(cfg.request_timeout_secs.max(1)),
        }
    }
}

/// Blocking Asana client. Cheap to share across threads: every request opens
/// its own curl handle.
#[derive(Debug, Clone)]
pub struct AsanaClient {
    base: Url,
    page_size: u32,
    http: HttpSettings,
}

impl AsanaClient {
    pub fn new(options: AsanaClientOptions) -> Result<Self, CatalogError> {
        let base = Url::parse(&options.base_url)?;
        if base.cannot_be_a_base() {
            return Err(CatalogError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self {
            base,
            page_size: options.page_size.max(1),
            http: HttpSettings {
                token: options.token,
                connect_timeout: options.connect_timeout,
                request_timeout: options.request_timeout,
            },
        })
    }

    /// Builds `<base>/<segments...>?<query>`; segments are percent-encoded.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, CatalogError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Follows `next_page.offset` until the listing is exhausted.
    fn list_all<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, CatalogError> {
        let limit = self.page_size.to_string();
        let mut out = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let mut pairs: Vec<(&str, &str)> = query.to_vec();
            pairs.push(("limit", limit.as_str()));
            if let Some(o) = offset.as_deref() {
                pairs.push(("offset", o));
            }
            let url = self.endpoint(segments, &pairs)?;
            tracing::debug!(url = %url, "catalog list page");
            let body = get_json_body(url.as_str(), &self.http)?;
            let page: Page<T> = serde_json::from_slice(&body)?;
            out.extend(page.data);

            match page.next_page {
                Some(next) if !next.offset.is_empty() => {
                    if offset.as_deref() == Some(next.offset.as_str()) {
                        tracing::warn!(url = %url, "catalog repeated a page offset; stopping");
                        break;
                    }
                    offset = Some(next.offset);
                }
                _ => break,
            }
        }
        Ok(out)
    }

    fn get_one<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = self.endpoint(segments, query)?;
        tracing::debug!(url = %url, "catalog get");
        let body = get_json_body(url.as_str(), &self.http)?;
        let single: Single<T> = serde_json::from_slice(&body)?;
        Ok(single.data)
    }
}

impl CatalogClient for AsanaClient {
    fn list_items(&self, collection_id: &str) -> Result<Vec<Item>, CatalogError> {
        let tasks: Vec<TaskCompact> = self.list_all(
            &["projects", collection_id, "tasks"],
            &[("opt_fields", "gid,name")],
        )?;
        Ok(tasks
            .into_iter()
            .map(|t| {
                let name = match t.name {
                    Some(n) if !n.trim().is_empty() => n,
                    _ => synthetic_task_name(&t.gid),
                };
                Item { id: t.gid, name }
            })
            .collect())
    }

    fn list_children(&self, item_id: &str) -> Result<Vec<AttachmentRef>, CatalogError> {
        let refs: Vec<AttachmentCompact> = self.list_all(
            &["attachments"],
            &[("parent", item_id), ("opt_fields", "gid")],
        )?;
        Ok(refs
            .into_iter()
            .map(|a| AttachmentRef {
                id: a.gid,
                item_id: item_id.to_string(),
            })
            .collect())
    }

    fn get_detail(&self, child_id: &str) -> Result<AttachmentDetail, CatalogError> {
        let att: AttachmentFull = self.get_one(
            &["attachments", child_id],
            &[("opt_fields", "name,download_url")],
        )?;
        let url = match att.download_url {
            Some(u) if !u.trim().is_empty() => u,
            _ => return Err(CatalogError::NoDownloadUrl(att.gid)),
        };
        Ok(AttachmentDetail {
            name: att.name.unwrap_or_default(),
            url,
        })
    }
}
