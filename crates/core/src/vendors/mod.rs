//! Vendors and the debts owed to them.

mod vendors_model;
mod vendors_service;
mod vendors_traits;

#[cfg(test)]
mod vendors_service_tests;

pub use vendors_model::{
    classify_debt, DebtFilter, DebtPayment, DebtStatus, NewVendor, NewVendorDebt, Vendor,
    VendorDebt, VendorDebtDetail, VendorDebtUpdate, VendorFilter, VendorUpdate,
};
pub use vendors_service::VendorService;
pub use vendors_traits::{VendorDebtRepositoryTrait, VendorRepositoryTrait, VendorServiceTrait};
