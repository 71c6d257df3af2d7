use k8s_openapi::api::core::v1::ObjectReference;
use kube::api::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A `wgpolicyk8s.io/v1alpha2` PolicyReport.
///
/// Unlike most custom resources, a report carries its content at the top level rather than under
/// a `spec`, so it is modeled as a plain object instead of a `CustomResource`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyReport {
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// The object the report applies to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<PolicyReportSummary>,

    #[serde(default)]
    pub results: Vec<PolicyReportResult>,
}

/// Counts of results by outcome, as reported by the scanner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyReportSummary {
    #[serde(default)]
    pub pass: u32,
    #[serde(default)]
    pub fail: u32,
    #[serde(default)]
    pub warn: u32,
    #[serde(default)]
    pub error: u32,
    #[serde(default)]
    pub skip: u32,
}

/// The outcome of a single policy check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyReportResult {
    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub policy: String,

    #[serde(default)]
    pub rule: String,

    /// Free text; scanners may join several sub-categories with commas.
    #[serde(default)]
    pub category: String,

    /// The scanner's own severity, if it sets one. Metrics derive severity from the
    /// `total_risk` property instead.
    #[serde(default)]
    pub severity: String,

    /// One of `pass`, `fail`, `warn`, `error` or `skip`; empty when the scanner omitted it.
    #[serde(default)]
    pub result: String,

    #[serde(default, alias = "description")]
    pub message: String,

    #[serde(default)]
    pub scored: bool,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl PolicyReportResult {
    pub const TOTAL_RISK: &'static str = "total_risk";

    pub fn total_risk(&self) -> Option<&str> {
        self.properties.get(Self::TOTAL_RISK).map(String::as_str)
    }
}
