use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::LoadService;
use crate::domain::{CreateTender, LoadStatus, Tender};
use crate::error::{BrokerError, Result};
use crate::events::LoadEvent;
use crate::store::StatusSwap;
use crate::validation;

const TENDER_REQUIRES_QUOTED: &str = "Tender can only be created for quoted loads";

impl LoadService {
    /// Record a carrier tender on a `quoted` load and move it to `tendered`.
    /// Returns the new tender id.
    #[instrument(skip(self, input), fields(carrier_id = %input.carrier_id))]
    pub async fn create_tender(&self, load_id: Uuid, input: CreateTender) -> Result<Uuid> {
        let load = self.get_load(load_id).await?;
        if load.status != LoadStatus::Quoted {
            return Err(BrokerError::invalid_state(
                TENDER_REQUIRES_QUOTED,
                LoadStatus::Quoted,
                load.status,
            ));
        }

        let carrier = self
            .directory
            .find_carrier_by_id(&input.carrier_id)
            .await?
            .ok_or_else(|| BrokerError::not_found("Carrier", &input.carrier_id))?;

        validation::validate_price(input.price_usd)?;
        let now = self.clock.now();
        let expires_at = validation::validate_expiry(&input.expires_at, now)?;

        if !carrier.equipment_types.is_empty() && !carrier.operates(&load.equipment_code) {
            warn!(
                "Carrier {} does not list equipment {} for load {}",
                carrier.id, load.equipment_code, load_id
            );
        }

        let tender = Tender::new(load_id, carrier.id, input.price_usd, expires_at);
        match self
            .loads
            .create_tender_and_transition(&tender, LoadStatus::Quoted)
            .await?
        {
            StatusSwap::Swapped => {}
            StatusSwap::Mismatch { actual } => {
                return Err(BrokerError::invalid_state(
                    TENDER_REQUIRES_QUOTED,
                    LoadStatus::Quoted,
                    actual,
                ));
            }
            StatusSwap::Missing => return Err(BrokerError::not_found("Load", load_id)),
        }

        info!(
            "Tender {} for load {} by carrier {} at ${} (expires {}, {} min left)",
            tender.id,
            load_id,
            tender.carrier_id,
            tender.price_usd,
            tender.expires_at,
            tender.remaining(now).num_minutes()
        );
        self.notifier.notify(LoadEvent::tendered(&tender));
        Ok(tender.id)
    }

    /// All tenders recorded for a load, oldest first
    pub async fn list_tenders(&self, load_id: Uuid) -> Result<Vec<Tender>> {
        self.get_load(load_id).await?;
        self.loads.find_tenders_by_load(load_id).await
    }

    /// Tenders that have not yet expired
    pub async fn active_tenders(&self, load_id: Uuid) -> Result<Vec<Tender>> {
        let now = self.clock.now();
        Ok(self
            .list_tenders(load_id)
            .await?
            .into_iter()
            .filter(|t| !t.is_expired(now))
            .collect())
    }
}
