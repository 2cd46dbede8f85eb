mod model;
mod repository;

pub use model::{VendorDB, VendorDebtDB};
pub use repository::{VendorDebtRepository, VendorRepository};
