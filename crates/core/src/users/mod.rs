//! Users, roles and the acting identity.

mod users_model;
mod users_service;
mod users_traits;


pub use users_model::{Actor, NewUser, Role, User, UserCredentials, UserUpdate};
pub use users_service::UserService;
pub use users_traits::{UserRepositoryTrait, UserServiceTrait};
