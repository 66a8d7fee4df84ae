use axum::{extract::State, http::StatusCode, Json};
use cpbc_core::{error::FetchError, refresh::RefreshContext};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub events: usize,
}

fn respond(
    result: Result<usize, FetchError>,
) -> Result<Json<RefreshResponse>, (StatusCode, String)> {
    match result {
        Ok(events) => Ok(Json(RefreshResponse { events })),
        Err(err) => Err((StatusCode::BAD_GATEWAY, err.to_string())),
    }
}

/// Handle manual refresh requests.
///
/// A failed fetch keeps the previous events and answers with `502 Bad Gateway`.
pub async fn handler(
    State(context): State<RefreshContext>,
) -> Result<Json<RefreshResponse>, (StatusCode, String)> {
    respond(context.refresh().await)
}
