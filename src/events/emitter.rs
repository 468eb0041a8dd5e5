use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Load, Tender};
use crate::error::{BrokerError, Result};

pub const LOAD_CREATED: &str = "load.created";
pub const LOAD_QUOTE_REQUESTED: &str = "load.quote_requested";
pub const LOAD_TENDERED: &str = "load.tendered";

/// Notification about a load state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadEvent {
    pub name: String,
    pub load_id: Uuid,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl LoadEvent {
    pub fn created(load: &Load) -> Self {
        let timestamp = Utc::now();
        Self {
            name: LOAD_CREATED.to_string(),
            load_id: load.id,
            payload: serde_json::json!({
                "load_id": load.id,
                "shipper_id": load.shipper_id,
                "timestamp": timestamp,
            }),
            timestamp,
        }
    }

    pub fn quote_requested(load_id: Uuid) -> Self {
        let timestamp = Utc::now();
        Self {
            name: LOAD_QUOTE_REQUESTED.to_string(),
            load_id,
            payload: serde_json::json!({
                "load_id": load_id,
                "timestamp": timestamp,
            }),
            timestamp,
        }
    }

    pub fn tendered(tender: &Tender) -> Self {
        let timestamp = Utc::now();
        Self {
            name: LOAD_TENDERED.to_string(),
            load_id: tender.load_id,
            payload: serde_json::json!({
                "load_id": tender.load_id,
                "tender_id": tender.id,
                "carrier_id": tender.carrier_id,
                "timestamp": timestamp,
            }),
            timestamp,
        }
    }
}

/// Downstream notification sink
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, event: &LoadEvent) -> Result<()>;
}

/// Writes events to the log and nothing else
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEmitter;

#[async_trait]
impl EventEmitter for TracingEmitter {
    async fn emit(&self, event: &LoadEvent) -> Result<()> {
        info!(event = %event.name, load_id = %event.load_id, payload = %event.payload, "event");
        Ok(())
    }
}

/// Fans events out to in-process subscribers
#[derive(Clone)]
pub struct BroadcastEmitter {
    tx: broadcast::Sender<LoadEvent>,
}

impl BroadcastEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoadEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl EventEmitter for BroadcastEmitter {
    async fn emit(&self, event: &LoadEvent) -> Result<()> {
        self.tx
            .send(event.clone())
            .map(|_| ())
            .map_err(|_| BrokerError::Emit(format!("no subscribers for {}", event.name)))
    }
}

/// Keeps every emitted event in memory, in order
#[derive(Clone, Default)]
pub struct RecordingEmitter {
    events: Arc<Mutex<Vec<LoadEvent>>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LoadEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn names(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.name).collect()
    }
}

#[async_trait]
impl EventEmitter for RecordingEmitter {
    async fn emit(&self, event: &LoadEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| BrokerError::Emit("recording emitter poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}
