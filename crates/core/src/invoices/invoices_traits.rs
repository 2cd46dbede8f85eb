use super::invoices_model::{Invoice, InvoiceFilter, InvoiceWithItems};
use crate::errors::Result;
use crate::utils::{Page, PageRequest};

/// Read access to invoices. Invoices are written by income postings.
pub trait InvoiceRepositoryTrait: Send + Sync {
    /// Newest first.
    fn list(&self, filter: &InvoiceFilter, page: PageRequest) -> Result<Page<Invoice>>;

    fn get_with_items(&self, invoice_id: &str) -> Result<InvoiceWithItems>;

    fn list_for_pilgrim(&self, pilgrim_id: &str) -> Result<Vec<Invoice>>;
}

pub trait InvoiceServiceTrait: Send + Sync {
    fn list_invoices(&self, filter: &InvoiceFilter, page: PageRequest) -> Result<Page<Invoice>>;

    fn get_invoice(&self, invoice_id: &str) -> Result<InvoiceWithItems>;

    fn list_pilgrim_invoices(&self, pilgrim_id: &str) -> Result<Vec<Invoice>>;
}
