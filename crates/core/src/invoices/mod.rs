//! Invoices derived from pilgrim income.

mod invoices_model;
mod invoices_service;
mod invoices_traits;

pub use invoices_model::{
    generate_invoice_number, Invoice, InvoiceDraft, InvoiceFilter, InvoiceItem, InvoiceItemDraft,
    InvoiceStatus, InvoiceWithItems,
};
pub use invoices_service::InvoiceService;
pub use invoices_traits::{InvoiceRepositoryTrait, InvoiceServiceTrait};
