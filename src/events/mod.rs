//! Load lifecycle notifications
//!
//! - `emitter`: event type, the `EventEmitter` seam and in-process sinks
//! - `notifier`: fire-and-forget wrapper used by the services
//! - `event_store`: PostgreSQL audit trail sink

pub mod emitter;
pub mod event_store;
pub mod notifier;

pub use emitter::{
    BroadcastEmitter, EventEmitter, LoadEvent, RecordingEmitter, TracingEmitter, LOAD_CREATED,
    LOAD_QUOTE_REQUESTED, LOAD_TENDERED,
};
pub use event_store::{EventMetadata, PgEventStore, StoredEvent};
pub use notifier::Notifier;
