//! CLI command handlers, one per file.

mod checksum;
mod completions;
mod run;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use run::run_archive;

#[cfg(test)]
pub(crate) use run::apply_overrides;
