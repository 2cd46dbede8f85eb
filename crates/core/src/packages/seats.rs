//! Seat accounting rules.

use super::packages_model::Package;
use crate::constants::{LOW_SEAT_THRESHOLD, SEAT_NOTIFICATION_LINK};
use crate::notifications::{NewBroadcast, NotificationType};

/// Seat counter changes implied by a pilgrim's package assignment changing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeatMove {
    /// Package whose counter goes down by one, floored at zero.
    pub release: Option<String>,
    /// Package whose counter goes up by one.
    pub reserve: Option<String>,
}

impl SeatMove {
    /// Seat changes for a pilgrim moving from `from` to `to`.
    ///
    /// Staying on the same package (or staying unassigned) changes nothing.
    pub fn between(from: Option<&str>, to: Option<&str>) -> Self {
        if from == to {
            return Self::default();
        }
        Self {
            release: from.map(str::to_string),
            reserve: to.map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.release.is_none() && self.reserve.is_none()
    }
}

/// Advisory raised after a seat was reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatAlert {
    Low { available: i32 },
    Full,
}

impl SeatAlert {
    /// Evaluates a package right after its counter was incremented.
    pub fn after_increment(package: &Package) -> Option<SeatAlert> {
        let available = package.available_seats();
        if available == 0 {
            Some(SeatAlert::Full)
        } else if (1..=LOW_SEAT_THRESHOLD).contains(&available) {
            Some(SeatAlert::Low { available })
        } else {
            None
        }
    }

    pub fn to_broadcast(&self, package: &Package) -> NewBroadcast {
        match self {
            SeatAlert::Low { available } => NewBroadcast {
                title: "Seat Paket Menipis".to_string(),
                message: format!(
                    "Paket {} tinggal {} seat tersedia",
                    package.name, available
                ),
                notification_type: NotificationType::Warning,
                link: Some(SEAT_NOTIFICATION_LINK.to_string()),
            },
            SeatAlert::Full => NewBroadcast {
                title: "Paket Penuh".to_string(),
                message: format!(
                    "Paket {} sudah tidak memiliki seat tersedia",
                    package.name
                ),
                notification_type: NotificationType::Error,
                link: Some(SEAT_NOTIFICATION_LINK.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::{PackageStatus, PackageType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn package(total: i32, booked: i32) -> Package {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Package {
            id: "pkg-1".into(),
            code: "UMR-01".into(),
            name: "Umroh Awal Tahun".into(),
            package_type: PackageType::Umroh,
            description: None,
            price_per_person: Decimal::from(30_000_000),
            total_seats: total,
            booked_seats: booked,
            departure_date: None,
            return_date: None,
            status: PackageStatus::Open,
            estimated_cost: None,
            actual_cost: Decimal::ZERO,
            hotel_makkah: None,
            hotel_madinah: None,
            airline: None,
            created_at: now,
            updated_at: now,
            created_by_id: None,
        }
    }

    #[test]
    fn alerts_by_remaining_capacity() {
        assert_eq!(SeatAlert::after_increment(&package(40, 10)), None);
        assert_eq!(
            SeatAlert::after_increment(&package(40, 35)),
            Some(SeatAlert::Low { available: 5 })
        );
        assert_eq!(
            SeatAlert::after_increment(&package(40, 39)),
            Some(SeatAlert::Low { available: 1 })
        );
        assert_eq!(
            SeatAlert::after_increment(&package(40, 40)),
            Some(SeatAlert::Full)
        );
        assert_eq!(SeatAlert::after_increment(&package(40, 41)), None);
    }

    #[test]
    fn full_alert_is_an_error_notification() {
        let broadcast = SeatAlert::Full.to_broadcast(&package(10, 10));
        assert_eq!(broadcast.title, "Paket Penuh");
        assert_eq!(broadcast.notification_type, NotificationType::Error);
        assert_eq!(broadcast.link.as_deref(), Some("/seat"));
    }

    #[test]
    fn seat_move_between_packages() {
        assert!(SeatMove::between(Some("a"), Some("a")).is_empty());
        assert!(SeatMove::between(None, None).is_empty());
        assert_eq!(
            SeatMove::between(Some("a"), Some("b")),
            SeatMove {
                release: Some("a".into()),
                reserve: Some("b".into())
            }
        );
        assert_eq!(
            SeatMove::between(None, Some("b")),
            SeatMove {
                release: None,
                reserve: Some("b".into())
            }
        );
    }
}
