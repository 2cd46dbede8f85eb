//! Amanah Core - domain models, services and repository traits for the
//! travel agency back office.
//!
//! The crate is database-agnostic. Repository traits are implemented by the
//! `amanah-storage-sqlite` crate.

#[macro_use]
mod macros;

pub mod audit;
pub mod chat;
pub mod company;
pub mod constants;
pub mod dashboard;
pub mod deletion;
pub mod errors;
pub mod invoices;
pub mod ledger;
pub mod notifications;
pub mod packages;
pub mod pilgrims;
pub mod regions;
pub mod reports;
pub mod transactions;
pub mod users;
pub mod utils;
pub mod vendors;

#[cfg(test)]
mod test_fixtures;

pub use errors::Error;
pub use errors::Result;
