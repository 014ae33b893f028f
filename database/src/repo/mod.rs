//! Repositories: one module per table group, every function running on a
//! caller-provided [`Session`](crate::Session).

pub mod processes;
pub mod programs;
pub mod students;
pub mod teachers;

use crate::error::{QUERY_MESSAGE, classify};
use chrono::{DateTime, NaiveDate, Utc};
use posgrado_core::AppError;
use serde::Deserialize;
use sqlx::Row;
use sqlx::any::AnyRow;

/// Largest page a listing returns.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Listing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Page {
    /// Rows to return, clamped to `1..=MAX_PAGE_SIZE`.
    pub limit: i64,
    /// Rows to skip.
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl Page {
    pub(crate) fn limit(self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    pub(crate) fn offset(self) -> i64 {
        self.offset.max(0)
    }
}

fn stored_value_error(column: &str, detail: impl std::fmt::Display) -> AppError {
    AppError::database_query(QUERY_MESSAGE)
        .with_source(std::io::Error::other(format!("column {column}: {detail}")))
}

pub(crate) fn text(row: &AnyRow, column: &str) -> Result<String, AppError> {
    row.try_get(column).map_err(classify)
}

pub(crate) fn opt_text(row: &AnyRow, column: &str) -> Result<Option<String>, AppError> {
    row.try_get(column).map_err(classify)
}

pub(crate) fn int(row: &AnyRow, column: &str) -> Result<i64, AppError> {
    row.try_get(column).map_err(classify)
}

pub(crate) fn opt_int(row: &AnyRow, column: &str) -> Result<Option<i64>, AppError> {
    row.try_get(column).map_err(classify)
}

/// Decode a closed-set text column with the enum's own parser.
pub(crate) fn parsed<T>(
    row: &AnyRow,
    column: &str,
    parse: fn(&str) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let raw = text(row, column)?;
    parse(&raw).map_err(|err| stored_value_error(column, err))
}

pub(crate) fn timestamp(row: &AnyRow, column: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = text(row, column)?;
    parse_timestamp(column, &raw)
}

pub(crate) fn opt_timestamp(row: &AnyRow, column: &str) -> Result<Option<DateTime<Utc>>, AppError> {
    opt_text(row, column)?
        .map(|raw| parse_timestamp(column, &raw))
        .transpose()
}

pub(crate) fn opt_date(row: &AnyRow, column: &str) -> Result<Option<NaiveDate>, AppError> {
    opt_text(row, column)?
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| stored_value_error(column, e))
        })
        .transpose()
}

fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| stored_value_error(column, e))
}

pub(crate) fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub(crate) fn date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}
