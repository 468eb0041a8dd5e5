//! Input validation for load and tender requests
//!
//! Every request crossing the service boundary is checked here before any
//! store call is made.

use crate::domain::{Coordinates, CreateLoad, Load, Location};
use crate::error::{BrokerError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Largest amount a `NUMERIC(12, 2)` column holds
pub const MAX_AMOUNT: Decimal = dec!(9999999999.99);

/// Decimal places kept for weights and prices
pub const AMOUNT_SCALE: u32 = 2;

fn validate_amount(field: &str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(BrokerError::InvalidInput(format!(
            "{} must be positive: {}",
            field, value
        )));
    }
    if value.normalize().scale() > AMOUNT_SCALE {
        return Err(BrokerError::InvalidInput(format!(
            "{} allows at most {} decimal places: {}",
            field, AMOUNT_SCALE, value
        )));
    }
    if value > MAX_AMOUNT {
        return Err(BrokerError::InvalidInput(format!(
            "{} exceeds {}: {}",
            field, MAX_AMOUNT, value
        )));
    }
    Ok(())
}

/// Validate a shipment weight (positive, two decimal places)
pub fn validate_weight(weight_lbs: Decimal) -> Result<()> {
    validate_amount("weight_lbs", weight_lbs)
}

/// Validate a pickup/delivery window (pickup must precede delivery)
pub fn validate_schedule(
    pickup_earliest: DateTime<Utc>,
    delivery_latest: DateTime<Utc>,
) -> Result<()> {
    if pickup_earliest >= delivery_latest {
        return Err(BrokerError::InvalidInput(format!(
            "pickup_earliest ({}) must be before delivery_latest ({})",
            pickup_earliest, delivery_latest
        )));
    }
    Ok(())
}

/// Validate a tender price (positive, cents precision)
pub fn validate_price(price_usd: Decimal) -> Result<()> {
    validate_amount("price_usd", price_usd)
}

fn validate_coordinates(field: &str, coords: &Coordinates) -> Result<()> {
    if !coords.lat.is_finite() || !(-90.0..=90.0).contains(&coords.lat) {
        return Err(BrokerError::InvalidInput(format!(
            "{}.coordinates.lat out of range: {}",
            field, coords.lat
        )));
    }
    if !coords.lng.is_finite() || !(-180.0..=180.0).contains(&coords.lng) {
        return Err(BrokerError::InvalidInput(format!(
            "{}.coordinates.lng out of range: {}",
            field, coords.lng
        )));
    }
    Ok(())
}

/// Validate a stop: city, state and zip are required
pub fn validate_location(field: &str, location: &Location) -> Result<()> {
    for (name, value) in [
        ("city", &location.city),
        ("state", &location.state),
        ("zip", &location.zip),
    ] {
        if value.trim().is_empty() {
            return Err(BrokerError::InvalidInput(format!(
                "{}.{} is required",
                field, name
            )));
        }
    }
    if let Some(coords) = &location.coordinates {
        validate_coordinates(field, coords)?;
    }
    Ok(())
}

/// Validate the self-contained parts of a create request.
/// Registry lookups (shipper, equipment) happen in the service.
pub fn validate_create_load(request: &CreateLoad) -> Result<()> {
    if request.shipper_id.trim().is_empty() {
        return Err(BrokerError::invalid_input("shipper_id is required"));
    }
    if request.equipment_code.trim().is_empty() {
        return Err(BrokerError::invalid_input("equipment_code is required"));
    }
    validate_weight(request.weight_lbs)?;
    validate_schedule(request.pickup_earliest, request.delivery_latest)?;
    validate_location("origin", &request.origin)?;
    validate_location("destination", &request.destination)?;
    Ok(())
}

/// Re-check invariants on a load after an update has been merged
pub fn validate_load(load: &Load) -> Result<()> {
    validate_weight(load.weight_lbs)?;
    validate_schedule(load.pickup_earliest, load.delivery_latest)?;
    validate_location("origin", &load.origin)?;
    validate_location("destination", &load.destination)?;
    Ok(())
}

/// Parse a caller-supplied timestamp.
///
/// Accepts RFC 3339 (`2024-01-21T00:00:00Z`, with offset) and the short UTC
/// form without seconds (`2024-01-21T00:00Z`).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Some(naive) = trimmed.strip_suffix('Z') {
        if let Ok(ts) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M") {
            return Ok(ts.and_utc());
        }
    }
    Err(BrokerError::InvalidInput(format!(
        "Invalid timestamp format: {}",
        raw
    )))
}

/// Parse a tender expiry and require it to be strictly after `now`
pub fn validate_expiry(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let expires_at = parse_timestamp(raw)?;
    if expires_at <= now {
        return Err(BrokerError::InvalidInput(format!(
            "expires_at must be in the future: {}",
            expires_at
        )));
    }
    Ok(expires_at)
}
