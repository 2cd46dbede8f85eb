//! Packages module - trip offerings, seat accounting and lifecycle status.

mod packages_model;
mod packages_service;
mod packages_traits;
mod seats;
mod status;


pub use packages_model::{
    NewPackage, Package, PackageFilter, PackageStatus, PackageSummary, PackageType, PackageUpdate,
};
pub use packages_service::PackageService;
pub use packages_traits::{PackageRepositoryTrait, PackageServiceTrait};
pub use seats::{SeatAlert, SeatMove};
pub use status::{
    evaluate_transition, PackageStatusService, PackageStatusServiceTrait, StatusRunSummary,
};
