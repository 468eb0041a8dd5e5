//! Best-effort delivery of load events.
//!
//! Emission runs off the request path and its failures are logged, never
//! returned to the operation that triggered them.

use std::sync::Arc;
use tracing::{debug, warn};

use super::emitter::{EventEmitter, LoadEvent};

#[derive(Clone)]
pub struct Notifier {
    emitter: Arc<dyn EventEmitter>,
}

impl Notifier {
    pub fn new(emitter: Arc<dyn EventEmitter>) -> Self {
        Self { emitter }
    }

    /// Emit on a detached task. Without a tokio runtime the event is dropped
    /// with a warning.
    pub fn notify(&self, event: LoadEvent) {
        let emitter = Arc::clone(&self.emitter);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    deliver(emitter.as_ref(), &event).await;
                });
            }
            Err(_) => {
                warn!(event = %event.name, "No runtime for event delivery, dropping");
            }
        }
    }

    /// Same best-effort delivery, awaited in place. Errors are still swallowed.
    pub async fn notify_and_wait(&self, event: LoadEvent) {
        deliver(self.emitter.as_ref(), &event).await;
    }
}

async fn deliver(emitter: &dyn EventEmitter, event: &LoadEvent) {
    match emitter.emit(event).await {
        Ok(()) => debug!(event = %event.name, load_id = %event.load_id, "Event emitted"),
        Err(e) => warn!(
            event = %event.name,
            load_id = %event.load_id,
            "Event emission failed: {}",
            e
        ),
    }
}
