use std::sync::Arc;

use super::regions_model::Region;
use super::regions_traits::{RegionRepositoryTrait, RegionServiceTrait};
use crate::errors::Result;

pub struct RegionService {
    repository: Arc<dyn RegionRepositoryTrait>,
}

impl RegionService {
    pub fn new(repository: Arc<dyn RegionRepositoryTrait>) -> Self {
        Self { repository }
    }
}

impl RegionServiceTrait for RegionService {
    fn provinces(&self) -> Result<Vec<Region>> {
        self.repository.provinces()
    }

    fn regencies(&self, province_id: &str) -> Result<Vec<Region>> {
        self.repository.regencies(province_id)
    }

    fn districts(&self, regency_id: &str) -> Result<Vec<Region>> {
        self.repository.districts(regency_id)
    }

    fn villages(&self, district_id: &str) -> Result<Vec<Region>> {
        self.repository.villages(district_id)
    }
}
