use crate::EventStream;
use futures::prelude::*;
use kube::core::DynamicObject;
pub use kube::runtime::watcher::{Error as WatchError, Event};
use tokio::time;
use tracing::{info, Instrument};

/// Wraps an event stream so that failures are logged rather than returned.
pub struct Watch {
    initialized: bool,
    span: tracing::Span,
    rx: EventStream,
}

// === impl Watch ===

impl From<EventStream> for Watch {
    fn from(rx: EventStream) -> Self {
        Self::new(rx)
    }
}

impl Watch {
    pub fn new(rx: EventStream) -> Watch {
        Self {
            rx,
            initialized: false,
            span: tracing::Span::current(),
        }
    }

    pub fn instrument(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Receive the next event in the stream.
    ///
    /// If the stream fails, log the error and sleep for 1s before polling for a reset event.
    /// Returns `None` once the underlying stream ends.
    pub async fn recv(&mut self) -> Option<Event<DynamicObject>> {
        loop {
            match self.rx.next().instrument(self.span.clone()).await? {
                Ok(ev) => {
                    if matches!(ev, Event::InitDone) {
                        self.initialized = true;
                    }
                    return Some(ev);
                }
                Err(error) => {
                    info!(parent: &self.span, %error, "Failed");
                    time::sleep(time::Duration::from_secs(1)).await;
                    info!(parent: &self.span, "Restarting");
                }
            }
        }
    }
}
