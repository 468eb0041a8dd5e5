//! Event Store for load lifecycle events
//!
//! Appends every emitted event to `load_events` as an immutable audit trail
//! that can be replayed per load.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use super::emitter::{EventEmitter, LoadEvent};
use crate::error::Result;

/// Metadata for stored events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Correlation ID for tracking related events
    pub correlation_id: Option<String>,
    /// User or system that triggered the event
    pub triggered_by: Option<String>,
}

impl EventMetadata {
    pub fn with_correlation(correlation_id: &str) -> Self {
        Self {
            correlation_id: Some(correlation_id.to_string()),
            ..Default::default()
        }
    }

    pub fn with_triggered_by(mut self, triggered_by: &str) -> Self {
        self.triggered_by = Some(triggered_by.to_string());
        self
    }
}

/// A stored event in the event store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: i64,
    pub load_id: Uuid,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Event store backed by PostgreSQL
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
    metadata: EventMetadata,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            metadata: EventMetadata::default().with_triggered_by("freight-broker"),
        }
    }

    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Append an event to the store
    pub async fn append(&self, event: &LoadEvent) -> Result<i64> {
        let metadata = serde_json::to_value(&self.metadata)?;

        let row = sqlx::query(
            r#"
            INSERT INTO load_events (load_id, event_type, payload, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(event.load_id)
        .bind(&event.name)
        .bind(&event.payload)
        .bind(&metadata)
        .bind(event.timestamp)
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = row.get("id");
        debug!("Appended event {} for load {} ({})", id, event.load_id, event.name);
        Ok(id)
    }

    /// Get all events for a load, oldest first
    pub async fn get_events(&self, load_id: Uuid) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, load_id, event_type, payload, metadata, created_at
            FROM load_events
            WHERE load_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(load_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| StoredEvent {
                id: row.get("id"),
                load_id: row.get("load_id"),
                event_type: row.get("event_type"),
                payload: row.get("payload"),
                metadata: row.get("metadata"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

#[async_trait]
impl EventEmitter for PgEventStore {
    async fn emit(&self, event: &LoadEvent) -> Result<()> {
        self.append(event).await.map(|_| ())
    }
}
