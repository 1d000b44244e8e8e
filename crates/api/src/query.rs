//! Shared query parameter types for API handlers.

use chrono::NaiveDate;
use mj_core::types::DbId;
use serde::Deserialize;

/// `?project_id=` filter used by the warehouse listings.
#[derive(Debug, Deserialize)]
pub struct ProjectIdParams {
    pub project_id: DbId,
}

/// Inclusive `?from=&to=` date range.
#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
    pub from: NaiveDate,
    pub to: NaiveDate,
}
