//! Package repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::packages_model::{
    NewPackage, Package, PackageFilter, PackageStatus, PackageSummary, PackageUpdate,
};
use crate::errors::Result;
use crate::users::Actor;
use crate::utils::{Page, PageRequest};

/// Persistence of packages.
///
/// Seat counters are owned by pilgrim writes and are never written here.
#[async_trait]
pub trait PackageRepositoryTrait: Send + Sync {
    /// Newest first.
    fn list(&self, filter: &PackageFilter, page: PageRequest) -> Result<Page<Package>>;

    fn list_all(&self) -> Result<Vec<Package>>;

    fn get_by_id(&self, package_id: &str) -> Result<Package>;

    fn get_by_code(&self, code: &str) -> Result<Option<Package>>;

    fn count_by_status(&self, status: PackageStatus) -> Result<i64>;

    async fn create(&self, package: Package) -> Result<Package>;

    /// Writes the editable columns of `package`.
    async fn update(&self, package: Package) -> Result<Package>;

    /// Removes the package. Refused with a constraint violation while any
    /// pilgrim still references it.
    async fn delete(&self, package_id: String) -> Result<usize>;

    async fn set_status(
        &self,
        package_id: String,
        status: PackageStatus,
        now: NaiveDateTime,
    ) -> Result<Package>;
}

#[async_trait]
pub trait PackageServiceTrait: Send + Sync {
    fn list_packages(&self, filter: &PackageFilter, page: PageRequest) -> Result<Page<Package>>;

    fn get_package(&self, package_id: &str) -> Result<Package>;

    fn get_package_by_code(&self, code: &str) -> Result<Package>;

    /// Package with seat figures, pilgrim count and money totals.
    fn get_package_summary(&self, package_id: &str) -> Result<PackageSummary>;

    /// Number of packages still open for booking.
    fn active_count(&self) -> Result<i64>;

    async fn create_package(&self, actor: &Actor, new_package: NewPackage) -> Result<Package>;

    async fn update_package(
        &self,
        actor: &Actor,
        package_id: &str,
        update: PackageUpdate,
    ) -> Result<Package>;

    async fn delete_package(&self, actor: &Actor, package_id: &str) -> Result<()>;
}
