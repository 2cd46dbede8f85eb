//! Ledger module - payment status rules, balance reconciliation and posting effects.

mod ledger_model;
mod ledger_service;
mod ledger_traits;


pub use ledger_model::{
    classify_status, reconcile, IncomeLine, LedgerEffect, LedgerSnapshot, PaymentDelta,
    PaymentStatus, RecalculationSummary,
};
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
