use kube::core::ApiResource;
use std::fmt;

/// Identifies a resource kind by group, version, kind and plural resource name.
///
/// The exporter reads every resource through the untyped API, so these coordinates stand in for
/// the `Resource` impls that generated types would carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceCoordinates {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
}

pub const POLICY_REPORTS: ResourceCoordinates = ResourceCoordinates {
    group: "wgpolicyk8s.io",
    version: "v1alpha2",
    kind: "PolicyReport",
    plural: "policyreports",
};

pub const CLUSTER_VERSIONS: ResourceCoordinates = ResourceCoordinates {
    group: "config.openshift.io",
    version: "v1",
    kind: "ClusterVersion",
    plural: "clusterversions",
};

pub const MANAGED_CLUSTERS: ResourceCoordinates = ResourceCoordinates {
    group: "cluster.open-cluster-management.io",
    version: "v1",
    kind: "ManagedCluster",
    plural: "managedclusters",
};

// === impl ResourceCoordinates ===

impl ResourceCoordinates {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            return self.version.to_string();
        }
        format!("{}/{}", self.group, self.version)
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.to_string(),
            version: self.version.to_string(),
            api_version: self.api_version(),
            kind: self.kind.to_string(),
            plural: self.plural.to_string(),
        }
    }
}

impl fmt::Display for ResourceCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.plural, self.group)
    }
}
