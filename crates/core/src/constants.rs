use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Share of the total that separates a down payment from an installment.
pub const CICILAN_THRESHOLD_RATIO: Decimal = dec!(0.3);

/// Available seats at or below this count raise a low-seat warning.
pub const LOW_SEAT_THRESHOLD: i32 = 5;

/// Open packages close this many days before departure.
pub const CLOSE_BEFORE_DEPARTURE_DAYS: i64 = 7;

/// Default page size for list endpoints
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Largest page size a caller may request
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Client route shown on seat notifications
pub const SEAT_NOTIFICATION_LINK: &str = "/seat";

/// Client route shown on vendor debt notifications
pub const VENDOR_DEBT_NOTIFICATION_LINK: &str = "/keuangan/hutang";

/// Client route shown on transaction notifications
pub const TRANSACTION_NOTIFICATION_LINK: &str = "/keuangan";
