use crate::{ExporterMetrics, ReportId, SharedIndex};
use ahash::AHashSet as HashSet;
use policyreport_exporter_core::{owning_cluster, Projector, ReportCounts};
use policyreport_exporter_k8s_api::{
    decode, DynamicObject, Event, PolicyReport, ResourceExt, Watch, POLICY_REPORTS,
};
use tokio::time;
use tracing::{debug, info, warn};

/// Projects watched PolicyReports into the shared index.
#[derive(Clone, Debug)]
pub struct Indexer {
    index: SharedIndex,
    projector: Projector,
    metrics: ExporterMetrics,
}

// === impl Indexer ===

impl Indexer {
    pub fn new(index: SharedIndex, projector: Projector, metrics: ExporterMetrics) -> Self {
        Self {
            index,
            projector,
            metrics,
        }
    }

    /// Indexes events until the watch ends.
    ///
    /// `namespace` must be the namespace the watch is scoped to, so that a relist only replaces
    /// reports from that namespace.
    pub async fn run(self, mut watch: Watch, namespace: Option<String>) {
        let mut relisting: Option<HashSet<ReportId>> = None;
        while let Some(event) = watch.recv().await {
            match event {
                Event::Init => {
                    debug!("Relisting PolicyReports");
                    relisting = Some(HashSet::new());
                }
                Event::InitApply(obj) => {
                    let id = self.apply(obj).await;
                    if let Some(seen) = relisting.as_mut() {
                        seen.insert(id);
                    }
                }
                Event::InitDone => {
                    if let Some(seen) = relisting.take() {
                        self.index.write().retain_seen(namespace.as_deref(), &seen);
                    }
                    info!(reports = self.index.read().len(), "PolicyReports indexed");
                }
                Event::Apply(obj) => {
                    self.apply(obj).await;
                }
                Event::Delete(obj) => {
                    let id = report_id(&obj);
                    if self.index.write().delete(&id) {
                        debug!(report = %id, "Removed PolicyReport");
                    }
                }
            }
        }
    }

    /// Re-projects every indexed report on each tick of `period`.
    pub async fn resync(self, period: time::Duration) {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        // The first tick completes immediately, while the watches are still listing.
        interval.tick().await;
        loop {
            interval.tick().await;
            self.resync_once().await;
        }
    }

    pub(crate) async fn resync_once(&self) {
        let reports = self.index.read().reports();
        debug!(reports = reports.len(), "Resyncing PolicyReports");
        for (id, report) in reports {
            let counts = self.project(&report).await;
            let version = report.metadata.resource_version.as_deref();
            if !self.index.write().update_counts(&id, version, counts) {
                debug!(report = %id, "PolicyReport changed during resync");
            }
        }
    }

    async fn apply(&self, obj: DynamicObject) -> ReportId {
        let id = report_id(&obj);
        match decode::<PolicyReport>(POLICY_REPORTS, obj) {
            Ok(report) => {
                let counts = self.project(&report).await;
                self.index.write().apply(id.clone(), Some(report), counts);
            }
            Err(error) => {
                info!(report = %id, %error, "Failed to decode PolicyReport");
                self.metrics.decode_failed(POLICY_REPORTS.plural);
                self.index
                    .write()
                    .apply(id.clone(), None, ReportCounts::default());
            }
        }
        id
    }

    async fn project(&self, report: &PolicyReport) -> ReportCounts {
        self.metrics.projected();
        match self.projector.try_project(report).await {
            Some(counts) => counts,
            None => {
                let cluster = owning_cluster(report).unwrap_or_default();
                warn!(%cluster, "Unable to resolve cluster id; PolicyReport is not exported");
                self.metrics.unresolved(cluster);
                ReportCounts::default()
            }
        }
    }
}

fn report_id(obj: &DynamicObject) -> ReportId {
    ReportId::new(obj.namespace().unwrap_or_default(), obj.name_any())
}
