#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod cluster;
mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
mod list_watch;
mod objects;
pub mod policy_report;
mod resource;
mod watch;

pub use self::{
    cluster::{ClusterVersion, ManagedCluster},
    error::Error,
    list_watch::PolicyReportListWatch,
    objects::{decode, ClusterObjects, EventStream, KubeObjects},
    policy_report::{PolicyReport, PolicyReportResult},
    resource::{ResourceCoordinates, CLUSTER_VERSIONS, MANAGED_CLUSTERS, POLICY_REPORTS},
    watch::{Event, Watch, WatchError},
};
pub use k8s_openapi::apimachinery;
pub use kube::{
    api::{ObjectMeta, ResourceExt},
    core::{ApiResource, DynamicObject},
    Client,
};
