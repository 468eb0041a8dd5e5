pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod logging;
pub mod service;
pub mod store;
pub mod validation;

pub use config::AppConfig;
pub use domain::{
    Carrier, CreateLoad, CreateTender, Load, LoadFilter, LoadStatus, Location, Page, Shipper,
    Tender, UpdateLoad,
};
pub use error::{BrokerError, ErrorKind, Result};
pub use events::{EventEmitter, LoadEvent, Notifier};
pub use service::{Clock, FixedClock, LoadService, Operation, SystemClock};
pub use store::{LoadRepository, MemoryDirectory, MemoryStore, PartyDirectory, PostgresStore};
