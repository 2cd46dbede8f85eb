mod model;
mod repository;

pub use model::AuditLogDB;
pub use repository::AuditRepository;
