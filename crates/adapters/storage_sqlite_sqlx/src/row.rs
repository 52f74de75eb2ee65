//! Column encoding shared by the repositories.
//!
//! Identifiers are stored as hyphenated UUID text, money as decimal text and
//! timestamps as fixed-width RFC 3339 text so that they sort lexically.

use std::str::FromStr;

use chrono::SecondsFormat;
use rust_decimal::Decimal;

use minishop_domain::time::Timestamp;

pub(crate) fn decode_err<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

pub(crate) fn parse<T>(value: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(value).map_err(decode_err)
}

pub(crate) fn parse_decimal(value: &str) -> Result<Decimal, sqlx::Error> {
    parse(value)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<Timestamp, sqlx::Error> {
    Ok(chrono::DateTime::parse_from_rfc3339(value)
        .map_err(decode_err)?
        .to_utc())
}

pub(crate) fn format_timestamp(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn to_u32(value: i64) -> Result<u32, sqlx::Error> {
    u32::try_from(value).map_err(decode_err)
}
