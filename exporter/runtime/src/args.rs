use crate::{
    core::{ClusterIdResolver, Projector},
    index::{self, ExporterMetrics, Index, Indexer},
    k8s::{ClusterObjects, KubeObjects, PolicyReportListWatch, Watch},
};
use anyhow::{bail, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "policyreport-exporter",
    about = "Exports PolicyReport results as Prometheus metrics"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "policyreport=info,warn",
        env = "POLICYREPORT_EXPORTER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Comma-separated namespaces to watch for PolicyReports.
    ///
    /// All namespaces are watched when empty.
    #[clap(long = "namespace", default_value = "")]
    namespaces: Namespaces,

    /// How often every indexed report is re-projected, in seconds. Zero disables resyncs.
    #[clap(long, default_value = "300")]
    resync_interval_secs: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Namespaces(Vec<String>);

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            namespaces,
            resync_interval_secs,
        } = self;

        let index = Index::shared();

        let mut prom = <Registry>::default();
        index::metrics::register(&mut prom, index.clone());
        let metrics = ExporterMetrics::register(
            prom.sub_registry_with_prefix("policyreport_exporter"),
            index.clone(),
        );
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        let objects: Arc<dyn ClusterObjects> = Arc::new(KubeObjects::new(runtime.client()));
        let projector = Projector::new(ClusterIdResolver::new(objects.clone()));
        let indexer = Indexer::new(index, projector, metrics);

        // Spawn a PolicyReport watch per namespace.
        for namespace in namespaces.scopes() {
            let span = info_span!(
                "policyreports",
                namespace = namespace.as_deref().unwrap_or("*")
            );
            let lw = PolicyReportListWatch::new(objects.clone(), namespace.clone());
            let watch = Watch::from(lw.watch()).instrument(span.clone());
            tokio::spawn(indexer.clone().run(watch, namespace).instrument(span));
        }

        if resync_interval_secs > 0 {
            tokio::spawn(
                indexer
                    .resync(Duration::from_secs(resync_interval_secs))
                    .instrument(info_span!("resync")),
            );
        }

        info!("Exporting PolicyReports");

        // Block the main thread on the shutdown signal. Once it fires, wait for the background
        // tasks to complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}

// === impl Namespaces ===

impl Namespaces {
    /// Returns the scope of each watch: a single namespace, or `None` for all namespaces.
    fn scopes(&self) -> Vec<Option<String>> {
        if self.0.is_empty() {
            return vec![None];
        }
        self.0.iter().cloned().map(Some).collect()
    }
}

impl std::str::FromStr for Namespaces {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let mut namespaces = Vec::new();
        for ns in s.split(',').map(str::trim).filter(|ns| !ns.is_empty()) {
            if ns.contains(char::is_whitespace) || ns.contains('/') {
                bail!("invalid namespace: {ns:?}");
            }
            if !namespaces.iter().any(|n| n == ns) {
                namespaces.push(ns.to_string());
            }
        }
        Ok(Self(namespaces))
    }
}
