//! Helpers for mapping between SQLite column values and domain types.

use log::error;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::fmt::Display;
use std::str::FromStr;

/// Maximum number of parameters for SQLite IN (...) queries.
///
/// SQLite limits the number of bound parameters per statement (typically
/// 999), so lookups by a list of ids are split into chunks of this size.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Chunk a slice into smaller slices for batch SQLite queries.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Parses a stored decimal, accepting scientific notation written by older
/// tools. Unreadable values are logged and read as zero.
pub fn parse_decimal(value: &str, field: &str) -> Decimal {
    match Decimal::from_str(value) {
        Ok(d) => d,
        Err(e_decimal) => match f64::from_str(value).ok().and_then(Decimal::from_f64) {
            Some(d) => d,
            None => {
                error!(
                    "Failed to parse {} '{}' as Decimal ({}). Falling back to ZERO.",
                    field, value, e_decimal
                );
                Decimal::ZERO
            }
        },
    }
}

pub fn parse_optional_decimal(value: Option<&str>, field: &str) -> Option<Decimal> {
    value.map(|v| parse_decimal(v, field))
}

/// Decimal in the form it is stored.
pub fn decimal_text(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Parses a stored enum text, logging and falling back when the column holds
/// a value the domain no longer knows.
pub fn parse_text<T>(value: &str, fallback: T, field: &str) -> T
where
    T: FromStr,
    T::Err: Display,
{
    T::from_str(value).unwrap_or_else(|e| {
        error!("Unreadable {} '{}': {}", field, value, e);
        fallback
    })
}

/// Parses an optional enum column; unknown values read as absent.
pub fn parse_optional_text<T>(value: Option<&str>, field: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.and_then(|v| match T::from_str(v) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            error!("Unreadable {} '{}': {}", field, v, e);
            None
        }
    })
}

/// `%term%` for a case-insensitive LIKE match.
pub fn like_pattern(term: &str) -> String {
    format!("%{}%", term.trim())
}
