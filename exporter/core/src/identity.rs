use crate::k8s::{
    decode, ClusterObjects, ClusterVersion, ManagedCluster, CLUSTER_VERSIONS, MANAGED_CLUSTERS,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// The name under which the hub refers to itself.
pub const HUB_CLUSTER_NAME: &str = "local-cluster";

/// The managed-cluster claim holding the cluster's id.
pub const CLUSTER_ID_CLAIM: &str = "id.openshift.io";

const CLUSTER_VERSION_NAME: &str = "version";

/// Resolves a cluster name to the cluster's authoritative id.
///
/// Every call queries the cluster; nothing is cached.
#[derive(Clone)]
pub struct ClusterIdResolver {
    objects: Arc<dyn ClusterObjects>,
}

// === impl ClusterIdResolver ===

impl ClusterIdResolver {
    pub fn new(objects: Arc<dyn ClusterObjects>) -> Self {
        Self { objects }
    }

    /// Returns the cluster's id, or `None` when it cannot be determined.
    ///
    /// An empty id is treated as missing.
    pub async fn resolve(&self, cluster_name: &str) -> Option<String> {
        let id = if cluster_name == HUB_CLUSTER_NAME {
            self.hub_cluster_id().await?
        } else {
            self.managed_cluster_id(cluster_name).await?
        };
        if id.is_empty() {
            debug!(cluster = %cluster_name, "Cluster has an empty id");
            return None;
        }
        Some(id)
    }

    async fn hub_cluster_id(&self) -> Option<String> {
        let obj = match self
            .objects
            .get(CLUSTER_VERSIONS, None, CLUSTER_VERSION_NAME)
            .await
        {
            Ok(Some(obj)) => obj,
            Ok(None) => {
                warn!("ClusterVersion {CLUSTER_VERSION_NAME} not found");
                return None;
            }
            Err(error) => {
                warn!(%error, "Failed to get ClusterVersion");
                return None;
            }
        };

        match decode::<ClusterVersion>(CLUSTER_VERSIONS, obj) {
            Ok(cv) => Some(cv.spec.cluster_id),
            Err(error) => {
                warn!(%error, "Invalid ClusterVersion");
                None
            }
        }
    }

    async fn managed_cluster_id(&self, cluster_name: &str) -> Option<String> {
        let obj = match self.objects.get(MANAGED_CLUSTERS, None, cluster_name).await {
            Ok(Some(obj)) => obj,
            Ok(None) => {
                warn!(cluster = %cluster_name, "ManagedCluster not found");
                return None;
            }
            Err(error) => {
                warn!(cluster = %cluster_name, %error, "Failed to get ManagedCluster");
                return None;
            }
        };

        let mc = match decode::<ManagedCluster>(MANAGED_CLUSTERS, obj) {
            Ok(mc) => mc,
            Err(error) => {
                warn!(cluster = %cluster_name, %error, "Invalid ManagedCluster");
                return None;
            }
        };

        let id = mc.claim(CLUSTER_ID_CLAIM).map(str::to_string);
        if id.is_none() {
            debug!(cluster = %cluster_name, "ManagedCluster has no {CLUSTER_ID_CLAIM} claim");
        }
        id
    }
}

impl std::fmt::Debug for ClusterIdResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterIdResolver").finish_non_exhaustive()
    }
}
