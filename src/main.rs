use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use freight_broker::config::AppConfig;
use freight_broker::domain::{
    Carrier, CreateLoad, CreateTender, LoadFilter, Location, ServiceLevel, Shipper,
};
use freight_broker::error::{BrokerError, Result};
use freight_broker::events::{BroadcastEmitter, EventEmitter, PgEventStore};
use freight_broker::logging::{init_logging, init_logging_simple};
use freight_broker::service::{FixedClock, LoadService};
use freight_broker::store::{
    LoadRepository, MemoryDirectory, MemoryStore, PartyDirectory, PostgresStore,
};
use freight_broker::validation;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "freight-broker")]
#[command(author, version, about = "Load lifecycle and quote/tender workflow", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding default.toml and environment overrides
    #[arg(short, long, default_value = "config")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Walk one load through create, quote and tender
    Demo {
        /// Run against PostgreSQL instead of the in-memory store
        #[arg(long)]
        postgres: bool,
        /// Shipper that owns the demo load
        #[arg(long, default_value = "S1")]
        shipper: String,
        /// Carrier that tenders on it
        #[arg(long, default_value = "C1")]
        carrier: String,
        /// Pinned "now" used for tender expiry checks
        #[arg(long, default_value = "2024-01-19T12:00:00Z")]
        now: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match AppConfig::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging_simple();
            warn!("Failed to load config from {}: {}, using defaults", cli.config, e);
            AppConfig::default_config()
        }
    };
    init_logging(&config.logging);

    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("Config error: {}", e);
        }
        return Err(BrokerError::InvalidInput(errors.join("; ")));
    }

    match cli.command {
        Commands::Migrate => {
            let store =
                PostgresStore::new(&config.database.url, config.database.max_connections).await?;
            store.migrate().await?;
        }
        Commands::Demo {
            postgres,
            shipper,
            carrier,
            now,
        } => {
            let now = validation::parse_timestamp(&now)?;
            run_demo(&config, postgres, &shipper, &carrier, now).await?;
        }
    }

    Ok(())
}

async fn run_demo(
    config: &AppConfig,
    postgres: bool,
    shipper: &str,
    carrier: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let demo_shipper = Shipper {
        id: shipper.to_string(),
        name: "Acme Manufacturing".to_string(),
        email: "logistics@acme.example".to_string(),
    };
    let demo_carrier = Carrier {
        id: carrier.to_string(),
        name: "Interstate Hauling".to_string(),
        mc_number: "MC-123456".to_string(),
        dot_number: "1234567".to_string(),
        equipment_types: vec!["DRY_VAN".to_string(), "REEFER".to_string()],
    };

    let broadcast = BroadcastEmitter::new(config.events.channel_capacity);
    let mut rx = broadcast.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            println!("  event {} {}", event.name, event.payload);
        }
    });

    let (loads, directory, emitter): (
        Arc<dyn LoadRepository>,
        Arc<dyn PartyDirectory>,
        Arc<dyn EventEmitter>,
    ) = if postgres {
        let store =
            PostgresStore::new(&config.database.url, config.database.max_connections).await?;
        store.migrate().await?;
        store.upsert_shipper(&demo_shipper).await?;
        store.upsert_carrier(&demo_carrier).await?;
        let emitter: Arc<dyn EventEmitter> = if config.events.persist {
            Arc::new(PgEventStore::new(store.pool().clone()))
        } else {
            Arc::new(broadcast.clone())
        };
        let store = Arc::new(store);
        let loads: Arc<dyn LoadRepository> = store.clone();
        let directory: Arc<dyn PartyDirectory> = store;
        (loads, directory, emitter)
    } else {
        let directory = MemoryDirectory::with_standard_equipment();
        directory.add_shipper(demo_shipper);
        directory.add_carrier(demo_carrier);
        let loads: Arc<dyn LoadRepository> = Arc::new(MemoryStore::new());
        let directory: Arc<dyn PartyDirectory> = Arc::new(directory);
        let emitter: Arc<dyn EventEmitter> = Arc::new(broadcast.clone());
        (loads, directory, emitter)
    };

    let service = LoadService::new(loads, directory, emitter)
        .with_clock(Arc::new(FixedClock(now)))
        .with_listing(config.listing.clone());

    let load = service
        .create_load(CreateLoad {
            shipper_id: shipper.to_string(),
            origin: Location {
                name: "Acme Plant 2".to_string(),
                address: "4100 Industrial Pkwy".to_string(),
                city: "Dayton".to_string(),
                state: "OH".to_string(),
                zip: "45414".to_string(),
                coordinates: None,
            },
            destination: Location {
                name: "Southeast DC".to_string(),
                address: "900 Logistics Blvd".to_string(),
                city: "Atlanta".to_string(),
                state: "GA".to_string(),
                zip: "30336".to_string(),
                coordinates: None,
            },
            commodity: "Packaged auto parts".to_string(),
            weight_lbs: dec!(45000),
            equipment_code: "DRY_VAN".to_string(),
            pickup_earliest: validation::parse_timestamp("2024-01-20T08:00Z")?,
            delivery_latest: validation::parse_timestamp("2024-01-22T14:00Z")?,
            service_level: ServiceLevel::Standard,
            special_requirements: Vec::new(),
        })
        .await?;
    println!(
        "created load {} [{}] {} -> {}",
        load.id,
        load.status,
        load.origin.short_label(),
        load.destination.short_label()
    );

    service.request_quote(load.id).await?;
    println!("quote requested [{}]", service.get_load(load.id).await?.status);

    let tender_id = service
        .create_tender(
            load.id,
            CreateTender {
                carrier_id: carrier.to_string(),
                price_usd: dec!(2850),
                expires_at: "2024-01-21T00:00Z".to_string(),
            },
        )
        .await?;
    println!(
        "tender {} recorded [{}]",
        tender_id,
        service.get_load(load.id).await?.status
    );

    match service.request_quote(load.id).await {
        Err(e) => println!("second quote rejected: {}", e),
        Ok(()) => warn!("Second quote request unexpectedly accepted"),
    }

    let page = service
        .list_loads_default(&LoadFilter::by_shipper(shipper))
        .await?;
    println!(
        "shipper {} has {} load(s) over {} page(s)",
        shipper, page.pagination.total, page.pagination.total_pages
    );

    drop(service);
    drop(broadcast);
    if tokio::time::timeout(std::time::Duration::from_secs(1), printer)
        .await
        .is_err()
    {
        info!("Event printer still draining, exiting");
    }
    Ok(())
}
