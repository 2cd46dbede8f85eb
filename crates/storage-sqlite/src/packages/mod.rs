mod model;
mod repository;

pub use model::PackageDB;
pub use repository::PackageRepository;
pub(crate) use repository::{add_package_cost, load_package, move_seat};
