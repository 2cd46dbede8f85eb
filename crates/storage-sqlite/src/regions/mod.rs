mod repository;

pub use repository::RegionRepository;
