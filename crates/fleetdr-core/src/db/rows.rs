//! Column conversions shared by the query modules.
//!
//! Ids and timestamps are stored as TEXT, timestamps as RFC 3339 with nine
//! fractional digits. A value that fails to parse is reported as a
//! `FromSqlConversionFailure` on its column.

use std::str::FromStr;

use jiff::Timestamp;
use rusqlite::{types::Type, Row};
use uuid::Uuid;

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn invalid_data(idx: usize, message: String) -> rusqlite::Error {
    conversion_error(
        idx,
        std::io::Error::new(std::io::ErrorKind::InvalidData, message),
    )
}

pub(crate) fn uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn opt_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    row.get::<_, Option<String>>(idx)?
        .map(|text| Uuid::parse_str(&text).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub(crate) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(idx)?
        .parse::<Timestamp>()
        .map_err(|e| conversion_error(idx, e))
}

pub(crate) fn opt_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Timestamp>> {
    row.get::<_, Option<String>>(idx)?
        .map(|text| text.parse::<Timestamp>().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Parses an enum column through its `FromStr` impl.
pub(crate) fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let text: String = row.get(idx)?;
    text.parse::<T>().map_err(|msg| invalid_data(idx, msg))
}

pub(crate) fn opt_parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    row.get::<_, Option<String>>(idx)?
        .map(|text| text.parse::<T>().map_err(|msg| invalid_data(idx, msg)))
        .transpose()
}

pub(crate) fn opt_uuid_text(id: Option<Uuid>) -> Option<String> {
    id.map(|id| id.to_string())
}

/// Fixed nanosecond precision, so stored text sorts chronologically.
pub(crate) fn timestamp_text(ts: Timestamp) -> String {
    format!("{ts:.9}")
}

pub(crate) fn opt_timestamp_text(ts: Option<Timestamp>) -> Option<String> {
    ts.map(timestamp_text)
}
