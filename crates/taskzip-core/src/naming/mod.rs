//! Group and file naming.
//!
//! Maps task display names onto directory names that are safe on every
//! desktop filesystem, and derives a filename hint from a download URL when
//! the catalog does not report one.

mod path;
mod sanitize;

pub use path::filename_from_url_path;
pub use sanitize::sanitize;

use crate::model::Item;

/// Prefix used for synthetic names when the remote name is unusable.
pub const SYNTHETIC_TASK_PREFIX: &str = "task-";

/// Synthetic display name for a task with a blank name.
pub fn synthetic_task_name(id: &str) -> String {
    format!("{}{}", SYNTHETIC_TASK_PREFIX, id)
}

/// Directory name for an item's group.
///
/// The sanitized display name, or `task-<id>` when sanitizing leaves nothing
/// usable (blank names, or names made only of whitespace).
pub fn group_name(item: &Item) -> String {
    let sanitized = sanitize(&item.name);
    if is_usable_dir_name(&sanitized) {
        return sanitized;
    }
    let fallback = sanitize(&synthetic_task_name(&item.id));
    if is_usable_dir_name(&fallback) {
        fallback
    } else {
        // Ids are opaque; if even that is unusable fall back to the bare prefix.
        SYNTHETIC_TASK_PREFIX.trim_end_matches('-').to_string()
    }
}

fn is_usable_dir_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".."
}
