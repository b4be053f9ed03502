//! Column encodings shared by the repositories.

use chrono::SecondsFormat;
use hostflow_domain::time::Timestamp;

/// Fixed-width RFC 3339 so that `ORDER BY` and `<=` on the text column
/// follow time order.
pub(crate) fn encode_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(value: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

pub(crate) fn decode_optional_timestamp(
    value: Option<String>,
) -> Result<Option<Timestamp>, sqlx::Error> {
    value.as_deref().map(decode_timestamp).transpose()
}
