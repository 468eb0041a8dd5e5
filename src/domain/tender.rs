use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A carrier's priced, time-bounded offer to move one load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tender {
    pub id: Uuid,
    pub load_id: Uuid,
    pub carrier_id: String,
    pub price_usd: Decimal,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Tender {
    pub fn new(
        load_id: Uuid,
        carrier_id: impl Into<String>,
        price_usd: Decimal,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            load_id,
            carrier_id: carrier_id.into(),
            price_usd,
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        if self.is_expired(now) {
            chrono::Duration::zero()
        } else {
            self.expires_at - now
        }
    }
}

/// Input for `create_tender`. `expires_at` is caller-supplied text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTender {
    pub carrier_id: String,
    pub price_usd: Decimal,
    pub expires_at: String,
}
