use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use parking_lot::RwLock;
use policyreport_exporter_core::ReportCounts;
use policyreport_exporter_k8s_api::PolicyReport;
use std::{fmt, sync::Arc};

pub type SharedIndex = Arc<RwLock<Index>>;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportId {
    pub namespace: String,
    pub name: String,
}

/// Holds the latest projection of every watched PolicyReport.
#[derive(Debug, Default)]
pub struct Index {
    reports: HashMap<ReportId, Entry>,
}

#[derive(Debug)]
struct Entry {
    /// The decoded report, kept so that it can be re-projected. `None` when the object could not
    /// be decoded.
    report: Option<PolicyReport>,
    counts: ReportCounts,
}

// === impl ReportId ===

impl ReportId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// === impl Index ===

impl Index {
    pub fn shared() -> SharedIndex {
        Arc::new(RwLock::new(Self::default()))
    }

    pub fn apply(&mut self, id: ReportId, report: Option<PolicyReport>, counts: ReportCounts) {
        self.reports.insert(id, Entry { report, counts });
    }

    pub fn delete(&mut self, id: &ReportId) -> bool {
        self.reports.remove(id).is_some()
    }

    /// Drops every report in scope that is not in `seen`. A `None` namespace scopes over all
    /// namespaces.
    pub fn retain_seen(&mut self, namespace: Option<&str>, seen: &HashSet<ReportId>) {
        self.reports.retain(|id, _| {
            let in_scope = namespace.map_or(true, |ns| ns == id.namespace);
            !in_scope || seen.contains(id)
        });
    }

    /// Replaces a report's counts, provided the indexed report is still the version that was
    /// projected.
    pub fn update_counts(
        &mut self,
        id: &ReportId,
        resource_version: Option<&str>,
        counts: ReportCounts,
    ) -> bool {
        match self.reports.get_mut(id) {
            Some(entry)
                if entry
                    .report
                    .as_ref()
                    .is_some_and(|r| r.metadata.resource_version.as_deref() == resource_version) =>
            {
                entry.counts = counts;
                true
            }
            _ => false,
        }
    }

    /// Returns a copy of every decoded report.
    pub fn reports(&self) -> Vec<(ReportId, PolicyReport)> {
        self.reports
            .iter()
            .filter_map(|(id, e)| Some((id.clone(), e.report.clone()?)))
            .collect()
    }

    pub fn counts(&self, id: &ReportId) -> Option<&ReportCounts> {
        self.reports.get(id).map(|e| &e.counts)
    }

    /// Sums the counts of all reports.
    pub fn aggregate(&self) -> ReportCounts {
        let mut sum = ReportCounts::default();
        for entry in self.reports.values() {
            entry.counts.merge_into(&mut sum);
        }
        sum
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
