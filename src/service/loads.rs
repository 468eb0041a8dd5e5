use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::LoadService;
use crate::domain::{
    CreateLoad, Load, LoadFilter, LoadStatus, Page, PageRequest, Pagination, UpdateLoad,
};
use crate::error::{BrokerError, Result};
use crate::events::LoadEvent;
use crate::store::DeleteOutcome;
use crate::validation;

impl LoadService {
    /// Register a new load in `created` status
    #[instrument(skip(self, request), fields(shipper_id = %request.shipper_id))]
    pub async fn create_load(&self, request: CreateLoad) -> Result<Load> {
        validation::validate_create_load(&request)?;

        if self
            .directory
            .find_shipper_by_id(&request.shipper_id)
            .await?
            .is_none()
        {
            return Err(BrokerError::not_found("Shipper", &request.shipper_id));
        }

        self.require_equipment(&request.equipment_code).await?;

        let load = Load::from_request(request);
        self.loads.create_load(&load).await?;

        info!(
            "Load {} created: {} -> {} ({} lbs, {})",
            load.id,
            load.origin.short_label(),
            load.destination.short_label(),
            load.weight_lbs,
            load.equipment_code
        );

        self.notifier.notify(LoadEvent::created(&load));
        Ok(load)
    }

    pub async fn get_load(&self, id: Uuid) -> Result<Load> {
        debug!("Fetching load {}", id);
        self.loads
            .find_load_by_id(id)
            .await?
            .ok_or_else(|| BrokerError::not_found("Load", id))
    }

    /// Merge permitted fields. Status is only changed by the workflow operations.
    #[instrument(skip(self, update))]
    pub async fn update_load(&self, id: Uuid, update: UpdateLoad) -> Result<Load> {
        let mut load = self.get_load(id).await?;
        if update.is_empty() {
            return Ok(load);
        }

        if let Some(code) = update.equipment_code.as_deref() {
            if code != load.equipment_code {
                self.require_equipment(code).await?;
            }
        }

        load.apply(update);
        validation::validate_load(&load)?;

        let updated = self
            .loads
            .update_load(&load)
            .await?
            .ok_or_else(|| BrokerError::not_found("Load", id))?;

        info!("Load {} updated", id);
        Ok(updated)
    }

    /// Delete a load. Blocked once a carrier is engaged or any tender exists.
    #[instrument(skip(self))]
    pub async fn delete_load(&self, id: Uuid) -> Result<()> {
        let load = self.get_load(id).await?;
        if !load.status.is_deletable() {
            return Err(BrokerError::invalid_state(
                "Load can only be deleted before tendering or once closed",
                LoadStatus::Created,
                load.status,
            ));
        }

        match self.loads.delete_load(id).await? {
            DeleteOutcome::Deleted => {
                info!("Load {} deleted", id);
                Ok(())
            }
            DeleteOutcome::TendersAttached(tenders) => Err(BrokerError::TendersAttached {
                load_id: id.to_string(),
                tenders,
            }),
            DeleteOutcome::Missing => Err(BrokerError::not_found("Load", id)),
        }
    }

    /// Page through loads, narrowed by shipper then status, oldest first
    pub async fn list_loads(
        &self,
        page: u32,
        limit: u32,
        filter: &LoadFilter,
    ) -> Result<Page<Load>> {
        let request = PageRequest::new(page, limit, self.listing.max_limit)?;
        let (data, total) = self.loads.get_loads(filter, request).await?;
        debug!(
            "Listed {} of {} loads (page {}, limit {})",
            data.len(),
            total,
            request.page(),
            request.limit()
        );
        Ok(Page {
            data,
            pagination: Pagination::new(request, total),
        })
    }

    /// First page with the configured default size
    pub async fn list_loads_default(&self, filter: &LoadFilter) -> Result<Page<Load>> {
        self.list_loads(1, self.listing.default_limit, filter).await
    }

    async fn require_equipment(&self, code: &str) -> Result<()> {
        match self.directory.find_equipment_type_by_code(code).await? {
            Some(_) => Ok(()),
            None => Err(BrokerError::InvalidInput(format!(
                "Invalid equipment type: {}",
                code
            ))),
        }
    }
}
