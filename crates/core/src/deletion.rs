//! Per-entity deletion policies.

use serde::Serialize;

/// How removing an entity affects its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeletionPolicy {
    /// The row is removed.
    Hard,
    /// The row stays and is flagged inactive.
    SoftFlag,
}

pub const PILGRIM_DELETION: DeletionPolicy = DeletionPolicy::Hard;
pub const PACKAGE_DELETION: DeletionPolicy = DeletionPolicy::Hard;
pub const TRANSACTION_DELETION: DeletionPolicy = DeletionPolicy::Hard;
pub const VENDOR_DELETION: DeletionPolicy = DeletionPolicy::SoftFlag;
pub const VENDOR_DEBT_DELETION: DeletionPolicy = DeletionPolicy::Hard;
pub const USER_DELETION: DeletionPolicy = DeletionPolicy::SoftFlag;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_vendors_and_users_are_soft_deleted() {
        let hard = [
            PILGRIM_DELETION,
            PACKAGE_DELETION,
            TRANSACTION_DELETION,
            VENDOR_DEBT_DELETION,
        ];
        assert!(hard.iter().all(|p| *p == DeletionPolicy::Hard));
        assert_eq!(VENDOR_DELETION, DeletionPolicy::SoftFlag);
        assert_eq!(USER_DELETION, DeletionPolicy::SoftFlag);
    }
}
