use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::traits::{DeleteOutcome, LoadRepository, PartyDirectory, StatusSwap};
use crate::domain::{
    Carrier, Coordinates, EquipmentType, Load, LoadFilter, LoadStatus, Location, PageRequest,
    ServiceLevel, Shipper, Tender,
};
use crate::error::{BrokerError, Result};

const LOAD_COLUMNS: &str = r#"
    id, shipper_id,
    origin_name, origin_address, origin_city, origin_state, origin_zip, origin_lat, origin_lng,
    destination_name, destination_address, destination_city, destination_state, destination_zip,
    destination_lat, destination_lng,
    commodity, weight_lbs, equipment_code, pickup_earliest, delivery_latest,
    service_level, special_requirements, status, created_at, updated_at
"#;

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create a store from an existing connection pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Register a shipper unless one with the same id exists
    pub async fn upsert_shipper(&self, shipper: &Shipper) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO shippers (id, name, email) VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&shipper.id)
        .bind(&shipper.name)
        .bind(&shipper.email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Register a carrier unless one with the same id exists
    pub async fn upsert_carrier(&self, carrier: &Carrier) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO carriers (id, name, mc_number, dot_number, equipment_types)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&carrier.id)
        .bind(&carrier.name)
        .bind(&carrier.mc_number)
        .bind(&carrier.dot_number)
        .bind(&carrier.equipment_types)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn current_status(&self, id: Uuid) -> Result<Option<LoadStatus>> {
        let row = sqlx::query("SELECT status FROM loads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| parse_status(r.get("status"))).transpose()
    }
}

fn parse_status(raw: String) -> Result<LoadStatus> {
    raw.parse::<LoadStatus>().map_err(BrokerError::Storage)
}

fn location_from_row(row: &PgRow, prefix: &str) -> Location {
    let col = |name: &str| format!("{}_{}", prefix, name);
    let lat: Option<f64> = row.get(col("lat").as_str());
    let lng: Option<f64> = row.get(col("lng").as_str());
    Location {
        name: row.get(col("name").as_str()),
        address: row.get(col("address").as_str()),
        city: row.get(col("city").as_str()),
        state: row.get(col("state").as_str()),
        zip: row.get(col("zip").as_str()),
        coordinates: match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        },
    }
}

fn load_from_row(row: &PgRow) -> Result<Load> {
    let service_level: String = row.get("service_level");
    Ok(Load {
        id: row.get("id"),
        shipper_id: row.get("shipper_id"),
        origin: location_from_row(row, "origin"),
        destination: location_from_row(row, "destination"),
        commodity: row.get("commodity"),
        weight_lbs: row.get("weight_lbs"),
        equipment_code: row.get("equipment_code"),
        pickup_earliest: row.get("pickup_earliest"),
        delivery_latest: row.get("delivery_latest"),
        service_level: service_level
            .parse::<ServiceLevel>()
            .map_err(BrokerError::Storage)?,
        special_requirements: row.get("special_requirements"),
        status: parse_status(row.get("status"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn tender_from_row(row: &PgRow) -> Tender {
    Tender {
        id: row.get("id"),
        load_id: row.get("load_id"),
        carrier_id: row.get("carrier_id"),
        price_usd: row.get::<Decimal, _>("price_usd"),
        expires_at: row.get::<DateTime<Utc>, _>("expires_at"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl LoadRepository for PostgresStore {
    #[instrument(skip(self, load), fields(load_id = %load.id))]
    async fn create_load(&self, load: &Load) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO loads (
                id, shipper_id,
                origin_name, origin_address, origin_city, origin_state, origin_zip,
                origin_lat, origin_lng,
                destination_name, destination_address, destination_city, destination_state,
                destination_zip, destination_lat, destination_lng,
                commodity, weight_lbs, equipment_code, pickup_earliest, delivery_latest,
                service_level, special_requirements, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
            "#,
        )
        .bind(load.id)
        .bind(&load.shipper_id)
        .bind(&load.origin.name)
        .bind(&load.origin.address)
        .bind(&load.origin.city)
        .bind(&load.origin.state)
        .bind(&load.origin.zip)
        .bind(load.origin.coordinates.map(|c| c.lat))
        .bind(load.origin.coordinates.map(|c| c.lng))
        .bind(&load.destination.name)
        .bind(&load.destination.address)
        .bind(&load.destination.city)
        .bind(&load.destination.state)
        .bind(&load.destination.zip)
        .bind(load.destination.coordinates.map(|c| c.lat))
        .bind(load.destination.coordinates.map(|c| c.lng))
        .bind(&load.commodity)
        .bind(load.weight_lbs)
        .bind(&load.equipment_code)
        .bind(load.pickup_earliest)
        .bind(load.delivery_latest)
        .bind(load.service_level.as_str())
        .bind(&load.special_requirements)
        .bind(load.status.as_str())
        .bind(load.created_at)
        .bind(load.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_load_by_id(&self, id: Uuid) -> Result<Option<Load>> {
        let row = sqlx::query(&format!("SELECT {} FROM loads WHERE id = $1", LOAD_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(load_from_row).transpose()
    }

    #[instrument(skip(self, load), fields(load_id = %load.id))]
    async fn update_load(&self, load: &Load) -> Result<Option<Load>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE loads SET
                origin_name = $2, origin_address = $3, origin_city = $4, origin_state = $5,
                origin_zip = $6, origin_lat = $7, origin_lng = $8,
                destination_name = $9, destination_address = $10, destination_city = $11,
                destination_state = $12, destination_zip = $13, destination_lat = $14,
                destination_lng = $15,
                commodity = $16, weight_lbs = $17, equipment_code = $18,
                pickup_earliest = $19, delivery_latest = $20, service_level = $21,
                special_requirements = $22, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LOAD_COLUMNS
        ))
        .bind(load.id)
        .bind(&load.origin.name)
        .bind(&load.origin.address)
        .bind(&load.origin.city)
        .bind(&load.origin.state)
        .bind(&load.origin.zip)
        .bind(load.origin.coordinates.map(|c| c.lat))
        .bind(load.origin.coordinates.map(|c| c.lng))
        .bind(&load.destination.name)
        .bind(&load.destination.address)
        .bind(&load.destination.city)
        .bind(&load.destination.state)
        .bind(&load.destination.zip)
        .bind(load.destination.coordinates.map(|c| c.lat))
        .bind(load.destination.coordinates.map(|c| c.lng))
        .bind(&load.commodity)
        .bind(load.weight_lbs)
        .bind(&load.equipment_code)
        .bind(load.pickup_earliest)
        .bind(load.delivery_latest)
        .bind(load.service_level.as_str())
        .bind(&load.special_requirements)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(load_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: LoadStatus,
        next: LoadStatus,
    ) -> Result<StatusSwap> {
        let transition = expected.transition_to(next)?;
        let result = sqlx::query(
            r#"
            UPDATE loads SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id)
        .bind(transition.from.as_str())
        .bind(transition.to.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            debug!("Load {} status {} -> {}", id, transition.from, transition.to);
            return Ok(StatusSwap::Swapped);
        }
        Ok(match self.current_status(id).await? {
            Some(actual) => StatusSwap::Mismatch { actual },
            None => StatusSwap::Missing,
        })
    }

    #[instrument(skip(self))]
    async fn delete_load(&self, id: Uuid) -> Result<DeleteOutcome> {
        let mut tx = self.pool.begin().await?;

        // Row lock keeps a concurrent tender insert from slipping in.
        let exists = sqlx::query("SELECT id FROM loads WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Ok(DeleteOutcome::Missing);
        }

        let tenders: i64 = sqlx::query("SELECT COUNT(*) AS n FROM tenders WHERE load_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?
            .get("n");
        if tenders > 0 {
            tx.rollback().await?;
            return Ok(DeleteOutcome::TendersAttached(tenders as u64));
        }

        sqlx::query("DELETE FROM loads WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn get_loads(&self, filter: &LoadFilter, page: PageRequest) -> Result<(Vec<Load>, u64)> {
        let status = filter.status.map(|s| s.as_str());
        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS n FROM loads
            WHERE ($1::TEXT IS NULL OR shipper_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            "#,
        )
        .bind(filter.shipper_id.as_deref())
        .bind(status)
        .fetch_one(&self.pool)
        .await?
        .get("n");

        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM loads
            WHERE ($1::TEXT IS NULL OR shipper_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at ASC, id ASC
            LIMIT $3 OFFSET $4
            "#,
            LOAD_COLUMNS
        ))
        .bind(filter.shipper_id.as_deref())
        .bind(status)
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let loads = rows.iter().map(load_from_row).collect::<Result<Vec<_>>>()?;
        Ok((loads, total as u64))
    }

    #[instrument(skip(self, tender), fields(load_id = %tender.load_id, tender_id = %tender.id))]
    async fn create_tender_and_transition(
        &self,
        tender: &Tender,
        expected: LoadStatus,
    ) -> Result<StatusSwap> {
        let transition = expected.transition_to(LoadStatus::Tendered)?;
        let mut tx = self.pool.begin().await?;

        // Conditional update first: only one concurrent caller can match.
        let swapped = sqlx::query(
            r#"
            UPDATE loads SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(tender.load_id)
        .bind(transition.from.as_str())
        .bind(transition.to.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if !swapped {
            tx.rollback().await?;
            return Ok(match self.current_status(tender.load_id).await? {
                Some(actual) => StatusSwap::Mismatch { actual },
                None => StatusSwap::Missing,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO tenders (id, load_id, carrier_id, price_usd, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(tender.id)
        .bind(tender.load_id)
        .bind(&tender.carrier_id)
        .bind(tender.price_usd)
        .bind(tender.expires_at)
        .bind(tender.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(StatusSwap::Swapped)
    }

    async fn find_tenders_by_load(&self, load_id: Uuid) -> Result<Vec<Tender>> {
        let rows = sqlx::query(
            r#"
            SELECT id, load_id, carrier_id, price_usd, expires_at, created_at
            FROM tenders WHERE load_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(load_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(tender_from_row).collect())
    }
}

#[async_trait]
impl PartyDirectory for PostgresStore {
    async fn find_shipper_by_id(&self, id: &str) -> Result<Option<Shipper>> {
        let row = sqlx::query("SELECT id, name, email FROM shippers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Shipper {
            id: r.get("id"),
            name: r.get("name"),
            email: r.get("email"),
        }))
    }

    async fn find_carrier_by_id(&self, id: &str) -> Result<Option<Carrier>> {
        let row = sqlx::query(
            "SELECT id, name, mc_number, dot_number, equipment_types FROM carriers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Carrier {
            id: r.get("id"),
            name: r.get("name"),
            mc_number: r.get("mc_number"),
            dot_number: r.get("dot_number"),
            equipment_types: r.get("equipment_types"),
        }))
    }

    async fn find_equipment_type_by_code(&self, code: &str) -> Result<Option<EquipmentType>> {
        let row = sqlx::query("SELECT code, description FROM equipment_types WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| EquipmentType {
            code: r.get("code"),
            description: r.get("description"),
        }))
    }
}
