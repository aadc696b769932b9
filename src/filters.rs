//! Record-level time filtering over archived JSON values.
//!
//! All interval checks here are half-open `[from, to)`: inclusive lower
//! bound, exclusive upper bound, matching the window convention.

use serde_json::Value;
use time::PrimitiveDateTime;

/// A record's `created_utc` as a unix timestamp, if present.
pub fn created_utc(record: &Value) -> Option<i64> {
    record.get("created_utc").and_then(Value::as_f64).map(|f| f as i64)
}

/// Interpret a window timestamp as UTC and return its unix timestamp.
pub fn to_unix(dt: PrimitiveDateTime) -> i64 {
    dt.assume_utc().unix_timestamp()
}

/// `from <= created_utc < to`. Records without a `created_utc` never match.
pub fn within_window(record: &Value, from: PrimitiveDateTime, to: PrimitiveDateTime) -> bool {
    match created_utc(record) {
        Some(ts) => ts >= to_unix(from) && ts < to_unix(to),
        None => false,
    }
}

/// Clone the records that fall inside `[from, to)`.
pub fn filter_by_window(
    records: &[Value],
    from: PrimitiveDateTime,
    to: PrimitiveDateTime,
) -> Vec<Value> {
    records
        .iter()
        .filter(|r| within_window(r, from, to))
        .cloned()
        .collect()
}
