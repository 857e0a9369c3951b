//! Creator analytics rows and aggregates.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use streamshort_core::types::DbId;

/// A daily row from the `creator_analytics` table.
#[derive(Debug, Clone, FromRow)]
pub struct CreatorAnalytics {
    pub creator_id: DbId,
    pub day: NaiveDate,
    pub views: i64,
    pub watch_time_seconds: i64,
    pub earnings: f64,
}

/// Totals over a time window, returned by the creator dashboard.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize)]
pub struct CreatorAnalyticsTotals {
    pub views: i64,
    pub watch_time_seconds: i64,
    pub earnings: f64,
}
