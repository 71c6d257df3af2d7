use crate::SharedIndex;
use policyreport_exporter_core::POLICY_REPORT_INFO;
use prometheus_client::{
    collector::Collector,
    encoding::{DescriptorEncoder, EncodeLabelSet, EncodeMetric},
    metrics::{counter::Counter, family::Family, gauge::ConstGauge, MetricType},
    registry::Registry,
};

/// Serializes the projected reports at scrape time.
#[derive(Debug)]
struct PolicyReportInfo(SharedIndex);

/// Reports the size of the index at scrape time.
#[derive(Debug)]
struct IndexSize(SharedIndex);

/// The exporter's own metrics.
#[derive(Clone, Debug, Default)]
pub struct ExporterMetrics {
    projections: Counter,
    decode_errors: Family<ResourceLabels, Counter>,
    unresolved_clusters: Family<ClusterLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct ResourceLabels {
    resource: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct ClusterLabels {
    cluster: String,
}

/// Registers the `policyreport_info` family.
pub fn register(reg: &mut Registry, index: SharedIndex) {
    reg.register_collector(Box::new(PolicyReportInfo(index)));
}

impl Collector for PolicyReportInfo {
    fn encode(&self, mut encoder: DescriptorEncoder<'_>) -> Result<(), std::fmt::Error> {
        // Different reports may resolve to the same cluster id; sum them so that each label set
        // is exported once.
        let counts = self.0.read().aggregate();

        let mut info_encoder = encoder.encode_descriptor(
            POLICY_REPORT_INFO.name,
            POLICY_REPORT_INFO.help,
            None,
            MetricType::Gauge,
        )?;
        for (key, n) in &counts {
            let labels = key.labels();
            let gauge = ConstGauge::new(*n as i64);
            let sample_encoder = info_encoder.encode_family(&labels)?;
            gauge.encode(sample_encoder)?;
        }
        Ok(())
    }
}

impl Collector for IndexSize {
    fn encode(&self, mut encoder: DescriptorEncoder<'_>) -> Result<(), std::fmt::Error> {
        let size = self.0.read().len();
        let gauge = ConstGauge::new(size as i64);
        let size_encoder = encoder.encode_descriptor(
            "indexed_reports",
            "The number of PolicyReports in the index",
            None,
            gauge.metric_type(),
        )?;
        gauge.encode(size_encoder)
    }
}

// === impl ExporterMetrics ===

impl ExporterMetrics {
    pub fn register(reg: &mut Registry, index: SharedIndex) -> Self {
        let projections = Counter::default();
        reg.register(
            "projections",
            "Count of PolicyReports projected",
            projections.clone(),
        );

        let decode_errors = Family::default();
        reg.register(
            "decode_errors",
            "Count of objects that could not be decoded",
            decode_errors.clone(),
        );

        let unresolved_clusters = Family::default();
        reg.register(
            "unresolved_clusters",
            "Count of projections skipped because the cluster id could not be resolved",
            unresolved_clusters.clone(),
        );

        reg.register_collector(Box::new(IndexSize(index)));

        Self {
            projections,
            decode_errors,
            unresolved_clusters,
        }
    }

    pub(crate) fn projected(&self) {
        self.projections.inc();
    }

    pub(crate) fn decode_failed(&self, resource: &str) {
        self.decode_errors
            .get_or_create(&ResourceLabels {
                resource: resource.to_string(),
            })
            .inc();
    }

    pub(crate) fn unresolved(&self, cluster: &str) {
        self.unresolved_clusters
            .get_or_create(&ClusterLabels {
                cluster: cluster.to_string(),
            })
            .inc();
    }
}
