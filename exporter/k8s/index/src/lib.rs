//! PolicyReport index
//!
//! Each watched PolicyReport is projected as it is applied, and the projection is kept in a shared
//! index keyed by the report's namespace and name. The index is read at scrape time to serialize
//! the `policyreport_info` family, so scrapes never wait on the cluster.
//!
//! Identity lookups happen while projecting, so a report is only as fresh as its last watch event.
//! A periodic resync re-projects every indexed report to pick up identity changes, e.g. a managed
//! cluster's id claim appearing after its report.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod index;
mod indexer;
pub mod metrics;

#[cfg(test)]
mod tests;

pub use self::{
    index::{Index, ReportId, SharedIndex},
    indexer::Indexer,
    metrics::ExporterMetrics,
};
