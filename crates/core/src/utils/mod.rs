pub mod money;
pub mod pagination;
pub mod time_utils;

pub use money::{format_rupiah, percent_of};
pub use pagination::{Page, PageInfo, PageRequest};
