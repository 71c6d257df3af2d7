use crate::Severity;
use std::collections::{btree_map, BTreeMap};

/// Describes a metric family: its name, help text and the order of its label keys.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MetricFamily {
    pub name: &'static str,
    pub help: &'static str,
    pub label_keys: [&'static str; 5],
}

/// The family that PolicyReport projections are exported as.
pub const POLICY_REPORT_INFO: MetricFamily = MetricFamily {
    name: "policyreport_info",
    help: "PolicyReport compliance info",
    label_keys: ["managed_cluster_id", "category", "policy", "result", "severity"],
};

/// Identifies a single exported sample.
///
/// Results that produce equal keys are the same observation and are counted together.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricResultKey {
    pub cluster_id: String,
    pub category: String,
    pub policy: String,
    pub result: String,
    pub severity: Severity,
}

/// The number of results for each distinct key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportCounts(BTreeMap<MetricResultKey, u64>);

// === impl MetricResultKey ===

impl MetricResultKey {
    /// Returns label pairs in the order of [`POLICY_REPORT_INFO`]'s label keys.
    pub fn labels(&self) -> [(&'static str, &str); 5] {
        let [cluster, category, policy, result, severity] = POLICY_REPORT_INFO.label_keys;
        [
            (cluster, self.cluster_id.as_str()),
            (category, self.category.as_str()),
            (policy, self.policy.as_str()),
            (result, self.result.as_str()),
            (severity, self.severity.as_str()),
        ]
    }
}

// === impl ReportCounts ===

impl ReportCounts {
    pub fn increment(&mut self, key: MetricResultKey) {
        *self.0.entry(key).or_default() += 1;
    }

    pub fn get(&self, key: &MetricResultKey) -> u64 {
        self.0.get(key).copied().unwrap_or(0)
    }

    /// The number of distinct keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of results counted across all keys.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, MetricResultKey, u64> {
        self.0.iter()
    }

    /// Adds this report's counts into `other`.
    pub fn merge_into(&self, other: &mut ReportCounts) {
        for (key, n) in &self.0 {
            *other.0.entry(key.clone()).or_default() += n;
        }
    }
}

impl<'a> IntoIterator for &'a ReportCounts {
    type Item = (&'a MetricResultKey, &'a u64);
    type IntoIter = btree_map::Iter<'a, MetricResultKey, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
