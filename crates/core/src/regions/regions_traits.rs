use super::regions_model::Region;
use crate::errors::Result;

/// Every list is sorted by name.
pub trait RegionRepositoryTrait: Send + Sync {
    fn provinces(&self) -> Result<Vec<Region>>;

    fn regencies(&self, province_id: &str) -> Result<Vec<Region>>;

    fn districts(&self, regency_id: &str) -> Result<Vec<Region>>;

    fn villages(&self, district_id: &str) -> Result<Vec<Region>>;
}

pub trait RegionServiceTrait: Send + Sync {
    fn provinces(&self) -> Result<Vec<Region>>;

    fn regencies(&self, province_id: &str) -> Result<Vec<Region>>;

    fn districts(&self, regency_id: &str) -> Result<Vec<Region>>;

    fn villages(&self, district_id: &str) -> Result<Vec<Region>>;
}
