use crate::{metrics, ExporterMetrics, Index, Indexer, ReportId, SharedIndex};
use futures::prelude::*;
use maplit::btreemap;
use policyreport_exporter_core::{ClusterIdResolver, Projector, CLUSTER_ID_CLAIM};
use policyreport_exporter_k8s_api::{
    fake::InMemoryObjects, DynamicObject, Event, PolicyReportListWatch, Watch, WatchError,
    CLUSTER_VERSIONS, MANAGED_CLUSTERS, POLICY_REPORTS,
};
use pretty_assertions::assert_eq;
use prometheus_client::registry::Registry;
use std::{collections::BTreeMap, sync::Arc};

struct Harness {
    objects: Arc<InMemoryObjects>,
    index: SharedIndex,
    indexer: Indexer,
    registry: Registry,
}

impl Harness {
    fn new() -> Self {
        let objects = Arc::new(InMemoryObjects::default());
        objects.insert_json(
            CLUSTER_VERSIONS,
            serde_json::json!({
                "apiVersion": "config.openshift.io/v1",
                "kind": "ClusterVersion",
                "metadata": { "name": "version" },
                "spec": { "clusterID": "mycluster_id" }
            }),
        );

        let index = Index::shared();
        let mut registry = Registry::default();
        metrics::register(&mut registry, index.clone());
        let exporter_metrics = ExporterMetrics::register(
            registry.sub_registry_with_prefix("policyreport_exporter"),
            index.clone(),
        );
        let projector = Projector::new(ClusterIdResolver::new(objects.clone()));
        let indexer = Indexer::new(index.clone(), projector, exporter_metrics);

        Self {
            objects,
            index,
            indexer,
            registry,
        }
    }

    fn managed_cluster(&self, name: &str, id: Option<&str>) {
        let claims = id
            .map(|id| vec![serde_json::json!({ "name": CLUSTER_ID_CLAIM, "value": id })])
            .unwrap_or_default();
        self.objects.insert_json(
            MANAGED_CLUSTERS,
            serde_json::json!({
                "apiVersion": "cluster.open-cluster-management.io/v1",
                "kind": "ManagedCluster",
                "metadata": { "name": name },
                "spec": { "hubAcceptsClient": true },
                "status": { "clusterClaims": claims }
            }),
        );
    }

    async fn run(&self, events: Vec<Event<DynamicObject>>, namespace: Option<&str>) {
        let rx = stream::iter(events.into_iter().map(Ok::<_, WatchError>)).boxed();
        self.indexer
            .clone()
            .run(Watch::from(rx), namespace.map(Into::into))
            .await;
    }

    fn scrape(&self) -> String {
        let mut buf = String::new();
        prometheus_client::encoding::text::encode(&mut buf, &self.registry)
            .expect("metrics must encode");
        buf
    }

    /// Returns every `policyreport_info` sample line.
    fn samples(&self) -> Vec<String> {
        self.scrape()
            .lines()
            .filter(|l| l.starts_with("policyreport_info{"))
            .map(String::from)
            .collect()
    }
}

fn report(namespace: &str, name: &str, results: serde_json::Value) -> DynamicObject {
    report_version(namespace, name, "1", results)
}

fn report_version(
    namespace: &str,
    name: &str,
    version: &str,
    results: serde_json::Value,
) -> DynamicObject {
    serde_json::from_value(serde_json::json!({
        "apiVersion": "wgpolicyk8s.io/v1alpha2",
        "kind": "PolicyReport",
        "metadata": { "name": name, "namespace": namespace, "resourceVersion": version },
        "results": results
    }))
    .expect("report must parse")
}

fn check(policy: &str, result: &str, total_risk: &str) -> serde_json::Value {
    let properties: BTreeMap<&str, &str> = btreemap! { "total_risk" => total_risk };
    serde_json::json!({
        "category": "openshift,configuration,service_availability",
        "policy": policy,
        "result": result,
        "properties": properties
    })
}

#[tokio::test]
async fn exports_hub_report() {
    let h = Harness::new();
    h.run(
        vec![
            Event::Init,
            Event::InitApply(report(
                "local-cluster",
                "local-cluster",
                serde_json::json!([check("MASTER_DEFINED_AS_MACHINESET", "fail", "4")]),
            )),
            Event::InitDone,
        ],
        None,
    )
    .await;

    let text = h.scrape();
    assert!(text.contains("# TYPE policyreport_info gauge"), "{text}");
    assert_eq!(
        h.samples(),
        vec![
            r#"policyreport_info{managed_cluster_id="mycluster_id",category="openshift,configuration,service_availability",policy="MASTER_DEFINED_AS_MACHINESET",result="fail",severity="critical"} 1"#
        ]
    );
    assert!(text.contains("policyreport_exporter_indexed_reports 1"), "{text}");
    assert!(text.contains("policyreport_exporter_projections_total 1"), "{text}");
}

#[tokio::test]
async fn duplicate_results_are_one_sample() {
    let h = Harness::new();
    h.run(
        vec![Event::Apply(report(
            "local-cluster",
            "local-cluster",
            serde_json::json!([
                check("P1", "fail", "2"),
                check("P1", "fail", "2"),
                check("P1", "", "2"),
                { "category": "ignored", "result": "fail" }
            ]),
        ))],
        None,
    )
    .await;

    assert_eq!(
        h.samples(),
        vec![
            r#"policyreport_info{managed_cluster_id="mycluster_id",category="openshift,configuration,service_availability",policy="P1",result="fail",severity="moderate"} 3"#
        ]
    );
}

#[tokio::test]
async fn unresolved_cluster_is_not_exported() {
    let h = Harness::new();
    h.managed_cluster("cluster1", None);
    h.run(
        vec![Event::Apply(report(
            "cluster1",
            "cluster1",
            serde_json::json!([check("P1", "fail", "4")]),
        ))],
        None,
    )
    .await;

    assert!(h.samples().is_empty());
    let id = ReportId::new("cluster1", "cluster1");
    assert_eq!(h.index.read().counts(&id).map(|c| c.is_empty()), Some(true));

    let text = h.scrape();
    assert!(
        text.contains(r#"policyreport_exporter_unresolved_clusters_total{cluster="cluster1"} 1"#),
        "{text}"
    );
}

#[tokio::test]
async fn undecodable_report_exports_nothing() {
    let h = Harness::new();
    h.run(
        vec![
            Event::Apply(report(
                "local-cluster",
                "local-cluster",
                serde_json::json!("not a list"),
            )),
            Event::Apply(report(
                "local-cluster",
                "other",
                serde_json::json!([check("P2", "pass", "1")]),
            )),
        ],
        None,
    )
    .await;

    // The undecodable report is indexed, but empty, and doesn't stop the other report.
    assert_eq!(h.index.read().len(), 2);
    assert_eq!(h.samples().len(), 1);
    assert!(h.samples()[0].contains(r#"policy="P2",result="pass",severity="low""#));

    let text = h.scrape();
    assert!(
        text.contains(r#"policyreport_exporter_decode_errors_total{resource="policyreports"} 1"#),
        "{text}"
    );
}

#[tokio::test]
async fn reports_sharing_a_cluster_id_are_summed() {
    let h = Harness::new();
    h.managed_cluster("cluster1", Some("shared"));
    h.managed_cluster("cluster2", Some("shared"));
    h.run(
        vec![
            Event::Apply(report(
                "cluster1",
                "cluster1",
                serde_json::json!([check("P1", "fail", "3")]),
            )),
            Event::Apply(report(
                "cluster2",
                "cluster2",
                serde_json::json!([check("P1", "fail", "3"), check("P2", "fail", "3")]),
            )),
        ],
        None,
    )
    .await;

    assert_eq!(
        h.samples(),
        vec![
            r#"policyreport_info{managed_cluster_id="shared",category="openshift,configuration,service_availability",policy="P1",result="fail",severity="important"} 2"#,
            r#"policyreport_info{managed_cluster_id="shared",category="openshift,configuration,service_availability",policy="P2",result="fail",severity="important"} 1"#,
        ]
    );
}

#[tokio::test]
async fn deleted_report_is_removed() {
    let h = Harness::new();
    let pr = report(
        "local-cluster",
        "local-cluster",
        serde_json::json!([check("P1", "fail", "4")]),
    );
    h.run(vec![Event::Apply(pr.clone()), Event::Delete(pr)], None).await;

    assert!(h.index.read().is_empty());
    assert!(h.samples().is_empty());
}

#[tokio::test]
async fn relist_replaces_reports_in_scope() {
    let h = Harness::new();
    h.managed_cluster("cluster1", Some("id1"));
    h.managed_cluster("cluster2", Some("id2"));
    h.run(
        vec![
            Event::Apply(report("cluster1", "a", serde_json::json!([check("P1", "fail", "1")]))),
            Event::Apply(report("cluster1", "b", serde_json::json!([check("P1", "fail", "1")]))),
            Event::Apply(report("cluster2", "c", serde_json::json!([check("P1", "fail", "1")]))),
        ],
        None,
    )
    .await;
    assert_eq!(h.index.read().len(), 3);

    // A relist of cluster1 that no longer contains `b` drops it, but leaves cluster2 alone.
    h.run(
        vec![
            Event::Init,
            Event::InitApply(report("cluster1", "a", serde_json::json!([check("P1", "fail", "1")]))),
            Event::InitDone,
        ],
        Some("cluster1"),
    )
    .await;

    let index = h.index.read();
    assert_eq!(index.len(), 2);
    assert!(index.counts(&ReportId::new("cluster1", "a")).is_some());
    assert!(index.counts(&ReportId::new("cluster1", "b")).is_none());
    assert!(index.counts(&ReportId::new("cluster2", "c")).is_some());
}

#[tokio::test]
async fn resync_picks_up_identity_changes() {
    let h = Harness::new();
    h.managed_cluster("cluster1", None);
    h.run(
        vec![Event::Apply(report(
            "cluster1",
            "cluster1",
            serde_json::json!([check("P1", "fail", "4")]),
        ))],
        None,
    )
    .await;
    assert!(h.samples().is_empty());

    h.managed_cluster("cluster1", Some("0d1b7a4e"));
    h.indexer.resync_once().await;
    assert_eq!(
        h.samples(),
        vec![
            r#"policyreport_info{managed_cluster_id="0d1b7a4e",category="openshift,configuration,service_availability",policy="P1",result="fail",severity="critical"} 1"#
        ]
    );

    h.objects.remove(MANAGED_CLUSTERS, None, "cluster1");
    h.indexer.resync_once().await;
    assert!(h.samples().is_empty());
}

#[tokio::test]
async fn indexes_from_list_watch() {
    let h = Harness::new();
    h.objects.insert(
        POLICY_REPORTS,
        report(
            "local-cluster",
            "local-cluster",
            serde_json::json!([check("MASTER_DEFINED_AS_MACHINESET", "fail", "4")]),
        ),
    );
    h.objects.insert(
        POLICY_REPORTS,
        report("elsewhere", "elsewhere", serde_json::json!([check("P1", "fail", "4")])),
    );

    let lw = PolicyReportListWatch::new(h.objects.clone(), Some("local-cluster".to_string()));
    h.indexer
        .clone()
        .run(Watch::from(lw.watch()), lw.namespace().map(Into::into))
        .await;

    assert_eq!(h.index.read().len(), 1);
    assert_eq!(h.samples().len(), 1);
}

#[test]
fn stale_resync_results_are_discarded() {
    let mut index = Index::default();
    let id = ReportId::new("cluster1", "cluster1");
    let pr = policyreport_exporter_k8s_api::decode(
        POLICY_REPORTS,
        report_version("cluster1", "cluster1", "2", serde_json::json!([])),
    )
    .expect("report must decode");
    index.apply(id.clone(), Some(pr), Default::default());

    assert!(!index.update_counts(&id, Some("1"), Default::default()));
    assert!(index.update_counts(&id, Some("2"), Default::default()));
    assert!(!index.update_counts(&ReportId::new("x", "y"), Some("2"), Default::default()));
}
