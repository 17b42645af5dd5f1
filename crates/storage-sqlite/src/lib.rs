//! SQLite storage implementation for FlipLedger.
//!
//! Implements the storage traits defined in `flipledger-core` with Diesel:
//! - Connection pooling and pragmas
//! - Embedded migrations
//! - A single writer actor that serializes every write
//! - Repositories for the catalog, the market data cache and sync runs
//!
//! This crate is the only place Diesel appears; `core` works with traits.
//!
//! ```text
//!   core (traits, sync, pricing)
//!            │
//!            ▼
//!   storage-sqlite (this crate)
//!            │
//!            ▼
//!        SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod catalog;
pub mod market_data;
pub mod sync;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use errors::{IntoCore, StorageError};

pub use catalog::CatalogRepository;
pub use market_data::MarketCacheRepository;
pub use sync::SyncRunRepository;

pub use flipledger_core::errors::{DatabaseError, Error, Result};
