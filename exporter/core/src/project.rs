use crate::{
    k8s::{PolicyReport, PolicyReportResult},
    ClusterIdResolver, MetricResultKey, ReportCounts, Severity, HUB_CLUSTER_NAME,
};
use tracing::{debug, warn};

/// The result recorded for checks that do not report one.
pub const DEFAULT_RESULT: &str = "fail";

/// Projects PolicyReports into counted metric keys.
#[derive(Clone, Debug)]
pub struct Projector {
    resolver: ClusterIdResolver,
}

// === impl Projector ===

impl Projector {
    pub fn new(resolver: ClusterIdResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ClusterIdResolver {
        &self.resolver
    }

    /// Counts the report's results by key.
    ///
    /// Returns nothing when the owning cluster's id cannot be resolved.
    pub async fn project(&self, report: &PolicyReport) -> ReportCounts {
        self.try_project(report).await.unwrap_or_default()
    }

    /// Like [`Projector::project`], but distinguishes a report whose cluster id could not be
    /// resolved (`None`) from one that has no countable results.
    pub async fn try_project(&self, report: &PolicyReport) -> Option<ReportCounts> {
        let Some(cluster_name) = owning_cluster(report) else {
            warn!("PolicyReport has neither a namespace nor a name");
            return None;
        };

        let Some(cluster_id) = self.resolver.resolve(cluster_name).await else {
            debug!(cluster = %cluster_name, "Unknown cluster id; skipping report");
            return None;
        };

        let counts = count_results(&cluster_id, &report.results);
        debug!(
            cluster = %cluster_name,
            %cluster_id,
            results = report.results.len(),
            keys = counts.len(),
            "Projected PolicyReport"
        );
        Some(counts)
    }
}

/// Returns the name of the cluster the report describes.
///
/// Reports live in their cluster's namespace. The hub's report is additionally named after the
/// hub; should the two ever disagree, the namespace wins.
pub fn owning_cluster(report: &PolicyReport) -> Option<&str> {
    let name = report.metadata.name.as_deref().filter(|n| !n.is_empty());
    let namespace = report
        .metadata
        .namespace
        .as_deref()
        .filter(|ns| !ns.is_empty());

    match (namespace, name) {
        (Some(ns), Some(name)) => {
            if ns != name && (ns == HUB_CLUSTER_NAME || name == HUB_CLUSTER_NAME) {
                warn!(
                    namespace = %ns,
                    %name,
                    "PolicyReport name and namespace disagree about the hub"
                );
            }
            Some(ns)
        }
        (Some(ns), None) => Some(ns),
        (None, name) => name,
    }
}

/// Counts results by key for an already-resolved cluster id.
///
/// Results without a policy are skipped.
pub fn count_results<'r>(
    cluster_id: &str,
    results: impl IntoIterator<Item = &'r PolicyReportResult>,
) -> ReportCounts {
    let mut counts = ReportCounts::default();
    for result in results {
        if result.policy.is_empty() {
            continue;
        }

        let outcome = if result.result.is_empty() {
            DEFAULT_RESULT
        } else {
            result.result.as_str()
        };

        counts.increment(MetricResultKey {
            cluster_id: cluster_id.to_string(),
            category: result.category.clone(),
            policy: result.policy.clone(),
            result: outcome.to_string(),
            severity: Severity::from_total_risk(result.total_risk()),
        });
    }
    counts
}
