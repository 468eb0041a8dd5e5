//! Load lifecycle operations
//!
//! `LoadService` is the single entry point a transport layer calls into:
//! - `loads`: create / get / update / delete / list
//! - `quotes`: `created -> quoted`
//! - `tenders`: `quoted -> tendered` plus tender reads

mod loads;
mod operation;
mod quotes;
mod tenders;

pub use operation::Operation;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::ListingConfig;
use crate::events::{EventEmitter, Notifier};
use crate::store::{LoadRepository, PartyDirectory};

/// Source of "now" for expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone)]
pub struct LoadService {
    loads: Arc<dyn LoadRepository>,
    directory: Arc<dyn PartyDirectory>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    listing: ListingConfig,
}

impl LoadService {
    pub fn new(
        loads: Arc<dyn LoadRepository>,
        directory: Arc<dyn PartyDirectory>,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        Self {
            loads,
            directory,
            notifier: Notifier::new(emitter),
            clock: Arc::new(SystemClock),
            listing: ListingConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_listing(mut self, listing: ListingConfig) -> Self {
        self.listing = listing;
        self
    }

    pub fn listing(&self) -> &ListingConfig {
        &self.listing
    }
}
