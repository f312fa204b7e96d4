//! taskzip core: collect every attachment of a project's tasks into one zip.
//!
//! Stages, leaf first: [`naming`] → [`catalog`] → [`resolver`] →
//! [`executor`] (over [`fetch`] and [`storage`]) → [`archive`], sequenced by
//! [`pipeline`].

pub mod config;
pub mod logging;

pub mod archive;
pub mod catalog;
pub mod checksum;
pub mod executor;
pub mod fetch;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod pool;
pub mod resolver;
pub mod storage;

#[cfg(test)]
mod test_support;
