mod model;
mod repository;

pub use model::{InvoiceDB, InvoiceItemDB};
pub use repository::InvoiceRepository;
pub(crate) use repository::{insert_invoice, sync_income_invoice};
