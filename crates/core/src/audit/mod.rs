//! Audit trail of changes made through the back office.

mod audit_model;
mod audit_service;
mod audit_traits;

pub use audit_model::{AuditAction, AuditFilter, AuditLog, NewAuditEntry};
pub use audit_service::AuditService;
pub use audit_traits::{AuditRepositoryTrait, AuditServiceTrait};
