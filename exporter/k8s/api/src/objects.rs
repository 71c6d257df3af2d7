use crate::{Error, ResourceCoordinates};
use futures::prelude::*;
use kube::{
    api::{Api, ListParams},
    core::DynamicObject,
    runtime::{watcher, WatchStreamExt},
    Client, ResourceExt,
};
use serde::de::DeserializeOwned;
use std::pin::Pin;

/// A stream of watch events for untyped objects.
pub type EventStream = Pin<
    Box<dyn Stream<Item = Result<watcher::Event<DynamicObject>, watcher::Error>> + Send + 'static>,
>;

/// Read-only access to cluster objects by resource coordinates.
///
/// Implementations must tolerate concurrent use.
#[async_trait::async_trait]
pub trait ClusterObjects: Send + Sync {
    /// Gets a single object. A missing object is `Ok(None)`.
    async fn get(
        &self,
        resource: ResourceCoordinates,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>, Error>;

    /// Lists all objects, in a single namespace or in all namespaces.
    async fn list(
        &self,
        resource: ResourceCoordinates,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, Error>;

    /// Watches objects, starting with the current state of the collection.
    fn watch(&self, resource: ResourceCoordinates, namespace: Option<&str>) -> EventStream;
}

/// Converts an untyped object into a typed one.
pub fn decode<T: DeserializeOwned>(
    resource: ResourceCoordinates,
    obj: DynamicObject,
) -> Result<T, Error> {
    let name = obj.name_any();
    serde_json::to_value(obj)
        .and_then(serde_json::from_value)
        .map_err(|source| Error::Decode {
            resource: resource.to_string(),
            name,
            source,
        })
}

/// Accesses objects through the Kubernetes API.
#[derive(Clone)]
pub struct KubeObjects {
    client: Client,
}

// === impl KubeObjects ===

impl KubeObjects {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, resource: ResourceCoordinates, namespace: Option<&str>) -> Api<DynamicObject> {
        let ar = resource.api_resource();
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        }
    }
}

impl std::fmt::Debug for KubeObjects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeObjects").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ClusterObjects for KubeObjects {
    async fn get(
        &self,
        resource: ResourceCoordinates,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>, Error> {
        let obj = self.api(resource, namespace).get_opt(name).await?;
        Ok(obj)
    }

    async fn list(
        &self,
        resource: ResourceCoordinates,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, Error> {
        let list = self
            .api(resource, namespace)
            .list(&ListParams::default())
            .await?;
        Ok(list.items)
    }

    fn watch(&self, resource: ResourceCoordinates, namespace: Option<&str>) -> EventStream {
        watcher(self.api(resource, namespace), watcher::Config::default())
            .default_backoff()
            .boxed()
    }
}
