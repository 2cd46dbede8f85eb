//! Indonesian administrative regions, read-only reference data.

mod regions_model;
mod regions_service;
mod regions_traits;

pub use regions_model::Region;
pub use regions_service::RegionService;
pub use regions_traits::{RegionRepositoryTrait, RegionServiceTrait};
