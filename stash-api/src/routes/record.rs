//! Record REST API Routes
//!
//! Store and fetch handlers for the record share flow. A stored payload
//! may arrive as plain JSON or wrapped in the compressed envelope; the
//! fetch side always returns the plain document.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use stash_core::{Document, RecordId};

use crate::compress::unwrap_envelope;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// Response body for record creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRecordResponse {
    pub id: RecordId,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/records - Store a document and return its generated id.
///
/// Storing succeeds as soon as the memory tier holds the document; the
/// lower tiers are populated best-effort by the coordinator, so this
/// handler has no failure path past input validation.
pub async fn create_record(
    State(state): State<AppState>,
    payload: Result<Json<Document>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(doc) = payload?;
    let doc = unwrap_envelope(doc, state.max_body_bytes)?;
    let id = state.store.store(doc).await;
    Ok((StatusCode::CREATED, Json(CreateRecordResponse { id })))
}

/// GET /api/records/:id - Fetch a stored document.
///
/// A malformed id cannot name any record, so it reports the same 404 as
/// a missing one.
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    let parsed = RecordId::parse(&id).map_err(|_| ApiError::record_not_found(&id))?;
    match state.store.fetch(&parsed).await {
        Some(doc) => Ok(Json(doc)),
        None => Err(ApiError::record_not_found(&parsed)),
    }
}

/// Create the record router.
pub fn create_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::post(create_record))
        .route("/:id", axum::routing::get(get_record))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_record_response_serialization() {
        let id = RecordId::parse("ab12cd").unwrap();
        let json = serde_json::to_string(&CreateRecordResponse { id }).unwrap();
        assert_eq!(json, r#"{"id":"ab12cd"}"#);
    }
}
