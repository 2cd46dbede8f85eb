mod model;
mod repository;

pub use model::PilgrimDB;
pub use repository::PilgrimRepository;
pub(crate) use repository::{load_pilgrim, save_pilgrim};
