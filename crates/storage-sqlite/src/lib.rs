//! SQLite storage implementation for Amanah.
//!
//! This crate holds every database concern of the back office using Diesel
//! with SQLite. It implements the repository traits defined in `amanah-core`
//! and contains:
//! - Connection pooling and PRAGMA setup
//! - Embedded migrations, including the province seed
//! - The single writer actor every mutation goes through
//! - Repository implementations and their Diesel row types
//!
//! ```text
//! core (domain + services)
//!          │
//!          ▼
//!  storage-sqlite (this crate)
//!          │
//!          ▼
//!      SQLite DB
//! ```
//!
//! Multi-row effects of a posting (pilgrim balance, package seats and cost,
//! invoices) run inside one writer job and therefore one transaction.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod audit;
pub mod chat;
pub mod company;
pub mod invoices;
pub mod ledger;
pub mod notifications;
pub mod packages;
pub mod pilgrims;
pub mod regions;
pub mod transactions;
pub mod users;
pub mod vendors;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, open, ping, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from amanah-core for convenience
pub use amanah_core::errors::{DatabaseError, Error, Result};
