use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::LoadStatus;

/// Requested service speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceLevel {
    #[default]
    Standard,
    Expedited,
    Urgent,
}

impl ServiceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Expedited => "expedited",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceLevel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "expedited" => Ok(Self::Expedited),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!(
                "Unknown service level: {} (expected standard|expedited|urgent)",
                raw
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Pickup or delivery stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Location {
    /// "City, ST" label used in logs
    pub fn short_label(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

/// A shipment request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub id: Uuid,
    pub shipper_id: String,
    pub origin: Location,
    pub destination: Location,
    pub commodity: String,
    pub weight_lbs: Decimal,
    pub equipment_code: String,
    pub pickup_earliest: DateTime<Utc>,
    pub delivery_latest: DateTime<Utc>,
    pub service_level: ServiceLevel,
    #[serde(default)]
    pub special_requirements: Vec<String>,
    pub status: LoadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Load {
    /// Build a fresh `created` load from a validated request
    pub fn from_request(request: CreateLoad) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            shipper_id: request.shipper_id,
            origin: request.origin,
            destination: request.destination,
            commodity: request.commodity,
            weight_lbs: request.weight_lbs,
            equipment_code: request.equipment_code,
            pickup_earliest: request.pickup_earliest,
            delivery_latest: request.delivery_latest,
            service_level: request.service_level,
            special_requirements: request.special_requirements,
            status: LoadStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge permitted fields from an update. Status is never touched here.
    pub fn apply(&mut self, update: UpdateLoad) {
        if let Some(origin) = update.origin {
            self.origin = origin;
        }
        if let Some(destination) = update.destination {
            self.destination = destination;
        }
        if let Some(commodity) = update.commodity {
            self.commodity = commodity;
        }
        if let Some(weight) = update.weight_lbs {
            self.weight_lbs = weight;
        }
        if let Some(code) = update.equipment_code {
            self.equipment_code = code;
        }
        if let Some(pickup) = update.pickup_earliest {
            self.pickup_earliest = pickup;
        }
        if let Some(delivery) = update.delivery_latest {
            self.delivery_latest = delivery;
        }
        if let Some(level) = update.service_level {
            self.service_level = level;
        }
        if let Some(reqs) = update.special_requirements {
            self.special_requirements = reqs;
        }
        self.updated_at = Utc::now();
    }

    /// Hours between earliest pickup and latest delivery
    pub fn transit_window_hours(&self) -> i64 {
        (self.delivery_latest - self.pickup_earliest).num_hours()
    }
}

/// Input for `create_load`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoad {
    pub shipper_id: String,
    pub origin: Location,
    pub destination: Location,
    pub commodity: String,
    pub weight_lbs: Decimal,
    pub equipment_code: String,
    pub pickup_earliest: DateTime<Utc>,
    pub delivery_latest: DateTime<Utc>,
    #[serde(default)]
    pub service_level: ServiceLevel,
    #[serde(default)]
    pub special_requirements: Vec<String>,
}

/// Input for `update_load`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLoad {
    pub origin: Option<Location>,
    pub destination: Option<Location>,
    pub commodity: Option<String>,
    pub weight_lbs: Option<Decimal>,
    pub equipment_code: Option<String>,
    pub pickup_earliest: Option<DateTime<Utc>>,
    pub delivery_latest: Option<DateTime<Utc>>,
    pub service_level: Option<ServiceLevel>,
    pub special_requirements: Option<Vec<String>>,
}

impl UpdateLoad {
    pub fn is_empty(&self) -> bool {
        self.origin.is_none()
            && self.destination.is_none()
            && self.commodity.is_none()
            && self.weight_lbs.is_none()
            && self.equipment_code.is_none()
            && self.pickup_earliest.is_none()
            && self.delivery_latest.is_none()
            && self.service_level.is_none()
            && self.special_requirements.is_none()
    }
}
