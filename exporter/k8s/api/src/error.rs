use crate::ResourceCoordinates;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Kube(#[from] kube::Error),

    #[error("failed to decode {resource} {name}: {source}")]
    Decode {
        resource: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} is unavailable")]
    Unavailable(ResourceCoordinates),
}
