mod repository;

pub use repository::{CompanySettingsDB, CompanyRepository};
