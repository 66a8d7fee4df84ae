use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use cpbc_core::{event::CollectionEvent, projection::events_between, refresh::RefreshContext};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

/// Handle event list requests.
///
/// `start` and `end` are RFC 3339 instants bounding the event starts, `end` exclusive.
/// Either bound may be left out.
pub async fn handler(
    State(context): State<RefreshContext>,
    Query(query_params): Query<QueryParams>,
) -> Json<Vec<CollectionEvent>> {
    let events = context.events().await;
    let window = events_between(
        &events,
        query_params.start.unwrap_or(DateTime::<Utc>::MIN_UTC),
        query_params.end.unwrap_or(DateTime::<Utc>::MAX_UTC),
    );
    Json(window.into_iter().cloned().collect())
}
