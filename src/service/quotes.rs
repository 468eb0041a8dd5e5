use tracing::{info, instrument};
use uuid::Uuid;

use super::LoadService;
use crate::domain::LoadStatus;
use crate::error::{BrokerError, Result};
use crate::events::LoadEvent;
use crate::store::StatusSwap;

const QUOTE_REQUIRES_CREATED: &str = "Quote can only be requested for created loads";

impl LoadService {
    /// Move a `created` load to `quoted` and notify pricing.
    #[instrument(skip(self))]
    pub async fn request_quote(&self, load_id: Uuid) -> Result<()> {
        let load = self.get_load(load_id).await?;
        if load.status != LoadStatus::Created {
            return Err(BrokerError::invalid_state(
                QUOTE_REQUIRES_CREATED,
                LoadStatus::Created,
                load.status,
            ));
        }

        match self
            .loads
            .compare_and_set_status(load_id, LoadStatus::Created, LoadStatus::Quoted)
            .await?
        {
            StatusSwap::Swapped => {}
            StatusSwap::Mismatch { actual } => {
                return Err(BrokerError::invalid_state(
                    QUOTE_REQUIRES_CREATED,
                    LoadStatus::Created,
                    actual,
                ));
            }
            StatusSwap::Missing => return Err(BrokerError::not_found("Load", load_id)),
        }

        info!("Load {} status created -> quoted", load_id);
        self.notifier.notify(LoadEvent::quote_requested(load_id));
        Ok(())
    }
}
