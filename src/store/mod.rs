//! Storage collaborators: repository traits plus in-memory and PostgreSQL backends.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::{MemoryDirectory, MemoryStore};
pub use postgres::PostgresStore;
pub use traits::{DeleteOutcome, LoadRepository, PartyDirectory, StatusSwap};
