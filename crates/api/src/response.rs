//! Shared response envelope types for API handlers.
//!
//! List and detail endpoints answer with a `{ "data": ... }` envelope.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Body for bulk operations that report how many rows they touched.
#[derive(Debug, Serialize)]
pub struct AffectedResponse {
    pub affected: u64,
}
