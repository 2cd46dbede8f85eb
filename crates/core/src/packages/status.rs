//! Date-driven package lifecycle transitions.

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::packages_model::{Package, PackageStatus};
use super::packages_traits::PackageRepositoryTrait;
use crate::constants::CLOSE_BEFORE_DEPARTURE_DAYS;
use crate::errors::Result;

/// Next status of a package at `now`, if it should change.
///
/// A package whose return date has passed completes; otherwise an open
/// package departing within the closing window closes. Completion wins when
/// both apply.
pub fn evaluate_transition(package: &Package, now: NaiveDateTime) -> Option<PackageStatus> {
    let can_complete = matches!(
        package.status,
        PackageStatus::Ongoing | PackageStatus::Closed
    );
    if can_complete && package.return_date.is_some_and(|r| r < now) {
        return Some(PackageStatus::Completed);
    }

    let closing_edge = now + Duration::days(CLOSE_BEFORE_DEPARTURE_DAYS);
    if package.status == PackageStatus::Open
        && package.departure_date.is_some_and(|d| d <= closing_edge)
    {
        return Some(PackageStatus::Closed);
    }
    None
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRunSummary {
    pub closed_count: usize,
    pub completed_count: usize,
}

#[async_trait]
pub trait PackageStatusServiceTrait: Send + Sync {
    /// Re-evaluates every package once and persists the transitions.
    async fn run_once(&self, now: NaiveDateTime) -> Result<StatusRunSummary>;
}

pub struct PackageStatusService {
    repository: Arc<dyn PackageRepositoryTrait>,
}

impl PackageStatusService {
    pub fn new(repository: Arc<dyn PackageRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl PackageStatusServiceTrait for PackageStatusService {
    async fn run_once(&self, now: NaiveDateTime) -> Result<StatusRunSummary> {
        let packages = self.repository.list_all()?;
        let mut summary = StatusRunSummary::default();

        for package in packages {
            let Some(next) = evaluate_transition(&package, now) else {
                continue;
            };
            self.repository
                .set_status(package.id.clone(), next, now)
                .await?;
            match next {
                PackageStatus::Completed => {
                    summary.completed_count += 1;
                    info!(
                        "Package \"{}\" ({}) marked as completed",
                        package.name, package.code
                    );
                }
                _ => {
                    summary.closed_count += 1;
                    info!(
                        "Package \"{}\" ({}) closed ahead of departure",
                        package.name, package.code
                    );
                }
            }
        }

        if summary.closed_count > 0 || summary.completed_count > 0 {
            info!(
                "Package status update: {} closed, {} completed",
                summary.closed_count, summary.completed_count
            );
        } else {
            debug!("Package status update: nothing to change");
        }
        Ok(summary)
    }
}
