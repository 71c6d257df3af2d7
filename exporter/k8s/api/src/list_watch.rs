use crate::{ClusterObjects, Error, EventStream, POLICY_REPORTS};
use kube::core::DynamicObject;
use std::sync::Arc;

/// Lists and watches PolicyReports in one namespace, or in all namespaces.
#[derive(Clone)]
pub struct PolicyReportListWatch {
    objects: Arc<dyn ClusterObjects>,
    namespace: Option<String>,
}

// === impl PolicyReportListWatch ===

impl PolicyReportListWatch {
    pub fn new(objects: Arc<dyn ClusterObjects>, namespace: Option<String>) -> Self {
        Self { objects, namespace }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub async fn list(&self) -> Result<Vec<DynamicObject>, Error> {
        self.objects.list(POLICY_REPORTS, self.namespace()).await
    }

    pub fn watch(&self) -> EventStream {
        self.objects.watch(POLICY_REPORTS, self.namespace())
    }
}

impl std::fmt::Debug for PolicyReportListWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyReportListWatch")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
