//! An in-memory [`ClusterObjects`] for tests.

use crate::{ClusterObjects, Error, EventStream, ResourceCoordinates};
use futures::prelude::*;
use kube::{core::DynamicObject, runtime::watcher, ResourceExt};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};

type Key = (&'static str, Option<String>, String);

#[derive(Debug, Default)]
pub struct InMemoryObjects {
    objects: Mutex<BTreeMap<Key, DynamicObject>>,
    unavailable: Mutex<HashSet<&'static str>>,
}

// === impl InMemoryObjects ===

impl InMemoryObjects {
    /// Stores an object, keyed by its own namespace and name.
    pub fn insert(&self, resource: ResourceCoordinates, obj: DynamicObject) {
        let key = (resource.plural, obj.namespace(), obj.name_any());
        self.objects.lock().insert(key, obj);
    }

    /// Stores an object described as JSON.
    ///
    /// Panics if the JSON does not describe an object.
    pub fn insert_json(&self, resource: ResourceCoordinates, obj: serde_json::Value) {
        let obj = serde_json::from_value(obj).expect("fixture must be a kubernetes object");
        self.insert(resource, obj);
    }

    pub fn remove(&self, resource: ResourceCoordinates, namespace: Option<&str>, name: &str) {
        self.objects.lock().remove(&(
            resource.plural,
            namespace.map(Into::into),
            name.to_string(),
        ));
    }

    /// Makes every request for the resource fail.
    pub fn fail(&self, resource: ResourceCoordinates) {
        self.unavailable.lock().insert(resource.plural);
    }

    fn check(&self, resource: ResourceCoordinates) -> Result<(), Error> {
        if self.unavailable.lock().contains(resource.plural) {
            return Err(Error::Unavailable(resource));
        }
        Ok(())
    }

    fn snapshot(
        &self,
        resource: ResourceCoordinates,
        namespace: Option<&str>,
    ) -> Vec<DynamicObject> {
        self.objects
            .lock()
            .iter()
            .filter(|((plural, ns, _), _)| {
                *plural == resource.plural
                    && namespace.map_or(true, |want| ns.as_deref() == Some(want))
            })
            .map(|(_, obj)| obj.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl ClusterObjects for InMemoryObjects {
    async fn get(
        &self,
        resource: ResourceCoordinates,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>, Error> {
        self.check(resource)?;
        let key = (resource.plural, namespace.map(Into::into), name.to_string());
        Ok(self.objects.lock().get(&key).cloned())
    }

    async fn list(
        &self,
        resource: ResourceCoordinates,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, Error> {
        self.check(resource)?;
        Ok(self.snapshot(resource, namespace))
    }

    /// Replays the current state as an initial listing, then ends.
    fn watch(&self, resource: ResourceCoordinates, namespace: Option<&str>) -> EventStream {
        let events = std::iter::once(watcher::Event::Init)
            .chain(
                self.snapshot(resource, namespace)
                    .into_iter()
                    .map(watcher::Event::InitApply),
            )
            .chain(std::iter::once(watcher::Event::InitDone))
            .map(Ok)
            .collect::<Vec<_>>();
        stream::iter(events).boxed()
    }
}
