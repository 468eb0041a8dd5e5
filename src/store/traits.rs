use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Carrier, EquipmentType, Load, LoadFilter, LoadStatus, PageRequest, Shipper, Tender,
};
use crate::error::Result;

/// Outcome of a conditional status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSwap {
    /// Status was `expected` and is now the requested value
    Swapped,
    /// Status was something else; nothing was written
    Mismatch { actual: LoadStatus },
    /// No load with that id
    Missing,
}

/// Outcome of a guarded delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Tenders reference the load; nothing was removed
    TendersAttached(u64),
    Missing,
}

/// Read-only lookups into registries owned by other services.
#[async_trait]
pub trait PartyDirectory: Send + Sync {
    async fn find_shipper_by_id(&self, id: &str) -> Result<Option<Shipper>>;

    async fn find_carrier_by_id(&self, id: &str) -> Result<Option<Carrier>>;

    async fn find_equipment_type_by_code(&self, code: &str) -> Result<Option<EquipmentType>>;
}

/// Persistence for loads and tenders. Every method is atomic at the record level.
#[async_trait]
pub trait LoadRepository: Send + Sync {
    async fn create_load(&self, load: &Load) -> Result<()>;

    async fn find_load_by_id(&self, id: Uuid) -> Result<Option<Load>>;

    /// Replace the non-status fields of a stored load. Returns `None` if absent.
    async fn update_load(&self, load: &Load) -> Result<Option<Load>>;

    /// Set `next` only if the current status equals `expected`.
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: LoadStatus,
        next: LoadStatus,
    ) -> Result<StatusSwap>;

    /// Delete a load only if no tender references it. The tender check and the
    /// removal are one unit.
    async fn delete_load(&self, id: Uuid) -> Result<DeleteOutcome>;

    /// Filtered, ordered page plus the full filtered count.
    async fn get_loads(&self, filter: &LoadFilter, page: PageRequest) -> Result<(Vec<Load>, u64)>;

    /// Persist `tender` and move its load from `expected` to `Tendered` as one unit.
    /// On anything but `Swapped` no tender is stored.
    async fn create_tender_and_transition(
        &self,
        tender: &Tender,
        expected: LoadStatus,
    ) -> Result<StatusSwap>;

    async fn find_tenders_by_load(&self, load_id: Uuid) -> Result<Vec<Tender>>;
}
