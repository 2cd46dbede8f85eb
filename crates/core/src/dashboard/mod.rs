//! Dashboard read models composed from the finance, pilgrim and package services.

mod dashboard_model;
mod dashboard_service;


pub use dashboard_model::{DashboardMetrics, DashboardOverview, ManifestEntry};
pub use dashboard_service::{
    DashboardService, DashboardServiceTrait, DEFAULT_CASHFLOW_MONTHS, DEFAULT_RECENT_LIMIT,
};
