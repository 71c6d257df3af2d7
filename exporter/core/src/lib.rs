//! PolicyReport projection.
//!
//! A PolicyReport lists the outcomes of policy checks run against a single cluster. Each report is
//! projected into a set of label tuples, one per distinct `(cluster id, category, policy, result,
//! severity)` combination, counting how many results share that combination:
//!
//! ```text
//! [ PolicyReport ] -> owning cluster name -> [ ClusterIdResolver ] -> cluster id
//!                  \-> results ---------------------------------------> [ ReportCounts ]
//! ```
//!
//! The cluster id is read from the hub's `ClusterVersion` for the hub's own report and from the
//! `ManagedCluster` claims for every other cluster. A report whose cluster id cannot be resolved
//! projects to nothing.
//!
//! Projections hold no state between calls; every call re-reads the identity resources.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod identity;
mod key;
mod project;
mod severity;

pub use self::{
    identity::{ClusterIdResolver, CLUSTER_ID_CLAIM, HUB_CLUSTER_NAME},
    key::{MetricFamily, MetricResultKey, ReportCounts, POLICY_REPORT_INFO},
    project::{count_results, owning_cluster, Projector, DEFAULT_RESULT},
    severity::Severity,
};
pub use policyreport_exporter_k8s_api as k8s;
