//! Pilgrims (jamaah): bookings, balances and seat assignment.

mod pilgrims_model;
mod pilgrims_service;
mod pilgrims_traits;

#[cfg(test)]
mod pilgrims_service_tests;

pub use pilgrims_model::{
    BulkPilgrimUpdate, Gender, NewPilgrim, Pilgrim, PilgrimChange, PilgrimCreated,
    PilgrimCreation, PilgrimFilter, PilgrimStats, PilgrimUpdate, RoomType, StatusCount,
};
pub use pilgrims_service::PilgrimService;
pub use pilgrims_traits::{PilgrimRepositoryTrait, PilgrimServiceTrait};
