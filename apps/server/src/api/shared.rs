use amanah_core::dashboard::DEFAULT_CASHFLOW_MONTHS;
use amanah_core::utils::time_utils::deserialize_optional_datetime;
use amanah_core::utils::PageRequest;
use chrono::NaiveDateTime;
use serde::Deserialize;

/// `page` and `limit` query parameters shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// `limit` query parameter of the short "recent" lists.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    pub fn or(&self, default: i64) -> i64 {
        self.limit.filter(|l| *l > 0).unwrap_or(default).min(100)
    }
}

/// Longest cashflow window a caller may ask for.
const MAX_CASHFLOW_MONTHS: u32 = 36;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end_date: Option<NaiveDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthsQuery {
    pub months: Option<u32>,
}

impl MonthsQuery {
    pub fn months(&self) -> u32 {
        self.months
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_CASHFLOW_MONTHS)
            .min(MAX_CASHFLOW_MONTHS)
    }
}
