//! In-process store backed by `DashMap`.
//!
//! Status swaps take the load's entry lock for the whole check-and-write, so
//! concurrent callers on the same load serialize. Lock order is always
//! `loads` then `tenders`.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::traits::{DeleteOutcome, LoadRepository, PartyDirectory, StatusSwap};
use crate::domain::{
    Carrier, EquipmentType, Load, LoadFilter, LoadStatus, PageRequest, Shipper, Tender,
};
use crate::error::{BrokerError, Result};

/// Loads and tenders held in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    loads: Arc<DashMap<Uuid, Load>>,
    tenders: Arc<DashMap<Uuid, Vec<Tender>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with a storage fault until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn load_count(&self) -> usize {
        self.loads.len()
    }

    pub fn tender_count(&self) -> usize {
        self.tenders.iter().map(|entry| entry.value().len()).sum()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BrokerError::Storage("memory store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LoadRepository for MemoryStore {
    #[instrument(skip(self, load), fields(load_id = %load.id))]
    async fn create_load(&self, load: &Load) -> Result<()> {
        self.check_available()?;
        if self.loads.contains_key(&load.id) {
            return Err(BrokerError::Storage(format!("duplicate load id {}", load.id)));
        }
        self.loads.insert(load.id, load.clone());
        Ok(())
    }

    async fn find_load_by_id(&self, id: Uuid) -> Result<Option<Load>> {
        self.check_available()?;
        Ok(self.loads.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update_load(&self, load: &Load) -> Result<Option<Load>> {
        self.check_available()?;
        let Some(mut entry) = self.loads.get_mut(&load.id) else {
            return Ok(None);
        };
        let status = entry.status;
        let created_at = entry.created_at;
        *entry = load.clone();
        entry.status = status;
        entry.created_at = created_at;
        Ok(Some(entry.clone()))
    }

    #[instrument(skip(self))]
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: LoadStatus,
        next: LoadStatus,
    ) -> Result<StatusSwap> {
        self.check_available()?;
        let transition = expected.transition_to(next)?;
        let Some(mut entry) = self.loads.get_mut(&id) else {
            return Ok(StatusSwap::Missing);
        };
        if entry.status != expected {
            return Ok(StatusSwap::Mismatch {
                actual: entry.status,
            });
        }
        entry.status = transition.to;
        entry.updated_at = transition.timestamp;
        debug!("Load {} status {} -> {}", id, transition.from, transition.to);
        Ok(StatusSwap::Swapped)
    }

    async fn delete_load(&self, id: Uuid) -> Result<DeleteOutcome> {
        self.check_available()?;
        let attached = |load_id: &Uuid| {
            self.tenders
                .get(load_id)
                .map(|t| t.len() as u64)
                .unwrap_or(0)
        };
        if self
            .loads
            .remove_if(&id, |load_id, _| attached(load_id) == 0)
            .is_some()
        {
            return Ok(DeleteOutcome::Deleted);
        }
        if self.loads.contains_key(&id) {
            return Ok(DeleteOutcome::TendersAttached(attached(&id)));
        }
        Ok(DeleteOutcome::Missing)
    }

    async fn get_loads(&self, filter: &LoadFilter, page: PageRequest) -> Result<(Vec<Load>, u64)> {
        self.check_available()?;
        let mut matching: Vec<Load> = self
            .loads
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|load| {
                filter
                    .shipper_id
                    .as_deref()
                    .map_or(true, |shipper| load.shipper_id == shipper)
            })
            .filter(|load| filter.status.map_or(true, |status| load.status == status))
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((data, total))
    }

    #[instrument(skip(self, tender), fields(load_id = %tender.load_id, tender_id = %tender.id))]
    async fn create_tender_and_transition(
        &self,
        tender: &Tender,
        expected: LoadStatus,
    ) -> Result<StatusSwap> {
        self.check_available()?;
        let transition = expected.transition_to(LoadStatus::Tendered)?;
        let Some(mut entry) = self.loads.get_mut(&tender.load_id) else {
            return Ok(StatusSwap::Missing);
        };
        if entry.status != expected {
            return Ok(StatusSwap::Mismatch {
                actual: entry.status,
            });
        }
        self.tenders
            .entry(tender.load_id)
            .or_default()
            .push(tender.clone());
        entry.status = transition.to;
        entry.updated_at = transition.timestamp;
        Ok(StatusSwap::Swapped)
    }

    async fn find_tenders_by_load(&self, load_id: Uuid) -> Result<Vec<Tender>> {
        self.check_available()?;
        Ok(self
            .tenders
            .get(&load_id)
            .map(|t| t.value().clone())
            .unwrap_or_default())
    }
}

/// Shipper, carrier and equipment registries held in memory
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    shippers: Arc<DashMap<String, Shipper>>,
    carriers: Arc<DashMap<String, Carrier>>,
    equipment: Arc<DashMap<String, EquipmentType>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory seeded with the standard equipment catalog
    pub fn with_standard_equipment() -> Self {
        let directory = Self::new();
        for equipment in EquipmentType::standard_catalog() {
            directory.add_equipment_type(equipment);
        }
        directory
    }

    pub fn add_shipper(&self, shipper: Shipper) {
        self.shippers.insert(shipper.id.clone(), shipper);
    }

    pub fn add_carrier(&self, carrier: Carrier) {
        self.carriers.insert(carrier.id.clone(), carrier);
    }

    pub fn add_equipment_type(&self, equipment: EquipmentType) {
        self.equipment.insert(equipment.code.clone(), equipment);
    }
}

#[async_trait]
impl PartyDirectory for MemoryDirectory {
    async fn find_shipper_by_id(&self, id: &str) -> Result<Option<Shipper>> {
        Ok(self.shippers.get(id).map(|s| s.value().clone()))
    }

    async fn find_carrier_by_id(&self, id: &str) -> Result<Option<Carrier>> {
        Ok(self.carriers.get(id).map(|c| c.value().clone()))
    }

    async fn find_equipment_type_by_code(&self, code: &str) -> Result<Option<EquipmentType>> {
        Ok(self.equipment.get(code).map(|e| e.value().clone()))
    }
}
