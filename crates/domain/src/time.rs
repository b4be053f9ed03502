//! Time and timestamp helpers.

use chrono::{DateTime, Datelike, SubsecRound, Utc};

/// UTC timestamp used for `logged_at`, scheduled and actual execution times, etc.
pub type Timestamp = DateTime<Utc>;

/// Last year a timestamp may fall in. RFC 3339 only has four-digit years.
pub const MAX_YEAR: i32 = 9999;

/// Whether `ts` has a four-digit, non-negative year and so can be written as
/// RFC 3339 text that sorts in time order.
#[must_use]
pub fn is_representable(ts: Timestamp) -> bool {
    (0..=MAX_YEAR).contains(&ts.year())
}

/// Return the current UTC time, truncated to microsecond precision.
///
/// Storage adapters persist timestamps with microsecond precision, so values
/// produced here survive a save/load cycle unchanged.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}
