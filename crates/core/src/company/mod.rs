//! Company profile printed on invoices and reports.

mod company_model;
mod company_service;
mod company_traits;

pub use company_model::{CompanySettings, CompanySettingsUpdate};
pub use company_service::CompanyService;
pub use company_traits::{CompanyRepositoryTrait, CompanyServiceTrait};
