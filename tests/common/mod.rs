#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use freight_broker::domain::{
    Carrier, CreateLoad, CreateTender, Location, ServiceLevel, Shipper,
};
use freight_broker::error::{BrokerError, Result};
use freight_broker::events::{EventEmitter, LoadEvent, RecordingEmitter};
use freight_broker::service::{FixedClock, LoadService};
use freight_broker::store::{MemoryDirectory, MemoryStore};
use freight_broker::validation::parse_timestamp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

pub struct Harness {
    pub service: LoadService,
    pub store: MemoryStore,
    pub events: RecordingEmitter,
}

/// Emitter whose sink is always down
pub struct FailingEmitter;

#[async_trait]
impl EventEmitter for FailingEmitter {
    async fn emit(&self, _event: &LoadEvent) -> Result<()> {
        Err(BrokerError::Emit("sink offline".to_string()))
    }
}

pub fn ts(raw: &str) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap()
}

pub fn directory() -> MemoryDirectory {
    let directory = MemoryDirectory::with_standard_equipment();
    directory.add_shipper(Shipper {
        id: "S1".into(),
        name: "Acme Manufacturing".into(),
        email: "logistics@acme.example".into(),
    });
    directory.add_shipper(Shipper {
        id: "S2".into(),
        name: "Globex".into(),
        email: "freight@globex.example".into(),
    });
    for id in ["C1", "C2"] {
        directory.add_carrier(Carrier {
            id: id.into(),
            name: format!("Carrier {}", id),
            mc_number: format!("MC-{}", id),
            dot_number: "1234567".into(),
            equipment_types: vec!["DRY_VAN".into()],
        });
    }
    directory
}

/// In-memory service with the clock pinned before the scenario expiry
pub fn harness() -> Harness {
    harness_with_emitter(None)
}

pub fn harness_with_emitter(emitter: Option<Arc<dyn EventEmitter>>) -> Harness {
    let store = MemoryStore::new();
    let events = RecordingEmitter::new();
    let emitter = emitter.unwrap_or_else(|| Arc::new(events.clone()));
    let service = LoadService::new(Arc::new(store.clone()), Arc::new(directory()), emitter)
        .with_clock(Arc::new(FixedClock(ts("2024-01-19T12:00:00Z"))));
    Harness {
        service,
        store,
        events,
    }
}

pub fn location(city: &str, state: &str, zip: &str) -> Location {
    Location {
        name: format!("{} DC", city),
        address: "100 Dock Rd".into(),
        city: city.into(),
        state: state.into(),
        zip: zip.into(),
        coordinates: None,
    }
}

pub fn dry_van_request(shipper: &str) -> CreateLoad {
    CreateLoad {
        shipper_id: shipper.into(),
        origin: location("Dayton", "OH", "45414"),
        destination: location("Atlanta", "GA", "30336"),
        commodity: "Packaged auto parts".into(),
        weight_lbs: dec!(45000),
        equipment_code: "DRY_VAN".into(),
        pickup_earliest: ts("2024-01-20T08:00Z"),
        delivery_latest: ts("2024-01-22T14:00Z"),
        service_level: ServiceLevel::Standard,
        special_requirements: Vec::new(),
    }
}

pub fn tender(carrier: &str, price: Decimal) -> CreateTender {
    CreateTender {
        carrier_id: carrier.into(),
        price_usd: price,
        expires_at: "2024-01-21T00:00Z".into(),
    }
}

/// Wait for detached event delivery to land
pub async fn wait_for_events(events: &RecordingEmitter, count: usize) -> Vec<String> {
    for _ in 0..200 {
        if events.events().len() >= count {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    events.names()
}
