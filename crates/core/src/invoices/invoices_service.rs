use std::sync::Arc;

use super::invoices_model::{Invoice, InvoiceFilter, InvoiceWithItems};
use super::invoices_traits::{InvoiceRepositoryTrait, InvoiceServiceTrait};
use crate::errors::Result;
use crate::utils::{Page, PageRequest};

pub struct InvoiceService {
    repository: Arc<dyn InvoiceRepositoryTrait>,
}

impl InvoiceService {
    pub fn new(repository: Arc<dyn InvoiceRepositoryTrait>) -> Self {
        Self { repository }
    }
}

impl InvoiceServiceTrait for InvoiceService {
    fn list_invoices(&self, filter: &InvoiceFilter, page: PageRequest) -> Result<Page<Invoice>> {
        self.repository.list(filter, page)
    }

    fn get_invoice(&self, invoice_id: &str) -> Result<InvoiceWithItems> {
        self.repository.get_with_items(invoice_id)
    }

    fn list_pilgrim_invoices(&self, pilgrim_id: &str) -> Result<Vec<Invoice>> {
        self.repository.list_for_pilgrim(pilgrim_id)
    }
}
