//! Attachment resolver: items → attachment refs → downloadable files.
//!
//! Two bounded fan-outs. Stage A lists the attachments of every item (one
//! request per item); stage B resolves the detail of every attachment across
//! all items at once, so its parallelism follows the attachment count rather
//! than being serialized inside each item. Catalog failures never abort the
//! run: a failed listing counts as zero attachments, a failed detail lookup
//! drops that one attachment.

use crate::catalog::CatalogClient;
use crate::model::{AttachmentDetail, AttachmentRef, GroupMap, Item, ResolvedFile};
use crate::naming::{filename_from_url_path, group_name};
use crate::pool::run_bounded;

/// Resolves every attachment of `items` into a group map.
///
/// The map holds one entry per item (sanitized name, see
/// [`group_name`]), even when the item has no attachments or every lookup
/// failed. Items whose names sanitize to the same group share its entry.
/// `concurrency` caps in-flight catalog requests within each stage.
pub fn resolve<C>(client: &C, items: &[Item], concurrency: usize) -> GroupMap
where
    C: CatalogClient + ?Sized,
{
    let mut groups = GroupMap::new();
    let named: Vec<(String, &Item)> = items.iter().map(|i| (group_name(i), i)).collect();
    for (group, _) in &named {
        groups.entry(group.clone()).or_default();
    }

    let listed = run_bounded(named, concurrency, |(group, item)| {
        match client.list_children(&item.id) {
            Ok(refs) => {
                tracing::debug!(item = %item.id, group = %group, count = refs.len(), "listed attachments");
                (group, refs)
            }
            Err(e) => {
                tracing::warn!(item = %item.id, group = %group, "listing attachments failed, treating as none: {}", e);
                (group, Vec::new())
            }
        }
    });

    let jobs: Vec<(String, AttachmentRef)> = listed
        .into_iter()
        .flat_map(|(group, refs)| refs.into_iter().map(move |r| (group.clone(), r)))
        .collect();
    let attachment_count = jobs.len();
    tracing::info!(items = items.len(), attachments = attachment_count, "attachment listing done");

    let resolved = run_bounded(jobs, concurrency, |(group, att)| {
        match client.get_detail(&att.id) {
            Ok(detail) => Some(ResolvedFile {
                filename: display_filename(&att, &detail),
                url: detail.url,
                group,
            }),
            Err(e) => {
                tracing::warn!(attachment = %att.id, item = %att.item_id, "attachment detail failed, skipping: {}", e);
                None
            }
        }
    });

    let mut file_count = 0usize;
    for file in resolved.into_iter().flatten() {
        file_count += 1;
        groups.entry(file.group.clone()).or_default().push(file);
    }
    tracing::info!(
        groups = groups.len(),
        files = file_count,
        dropped = attachment_count - file_count,
        "attachment resolution done"
    );
    groups
}

/// The reported attachment name; when blank, the URL's last path segment, then `attachment-<id>`.
fn display_filename(att: &AttachmentRef, detail: &AttachmentDetail) -> String {
    if !detail.name.trim().is_empty() {
        return detail.name.clone();
    }
    filename_from_url_path(&detail.url).unwrap_or_else(|| format!("attachment-{}", att.id))
}
