pub mod normal;
pub mod pink;

use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use cpbc_core::{
    event::CategoryBitmask, ical::generator::Emitter, refresh::RefreshContext,
    refuse_client::get_calendar,
};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    exclude_pink: bool,
    #[serde(default)]
    exclude_normal: bool,
}

impl From<&QueryParams> for CategoryBitmask {
    fn from(value: &QueryParams) -> Self {
        let mut category_bitmask = CategoryBitmask::none();
        if value.exclude_pink {
            category_bitmask |= CategoryBitmask::Pink;
        }
        if value.exclude_normal {
            category_bitmask |= CategoryBitmask::Normal;
        }
        category_bitmask
    }
}

/// Render the road's current events as iCalendar.
///
/// Fails until the first refresh has succeeded.
pub async fn handle(
    context: &RefreshContext,
    excluded_categories: CategoryBitmask,
) -> Result<Response, (StatusCode, String)> {
    let snapshot = context.snapshot().await;
    if snapshot.refreshed_at.is_none() {
        let message = snapshot
            .last_error
            .unwrap_or_else(|| String::from("collection dates have not been fetched yet"));
        return Err((StatusCode::SERVICE_UNAVAILABLE, message));
    }
    let ical_calendar = get_calendar(
        context.road_id(),
        context.road_name(),
        &snapshot.events,
        excluded_categories,
        context.timezone(),
    );
    let response = ([(CONTENT_TYPE, "text/calendar")], ical_calendar.generate()).into_response();
    Ok(response)
}

/// Handle calendar requests.
///
/// Categories can be left out with `exclude_pink` and `exclude_normal` in the query string.
pub async fn handler(
    State(context): State<RefreshContext>,
    Query(query_params): Query<QueryParams>,
) -> Result<Response, (StatusCode, String)> {
    handle(&context, CategoryBitmask::from(&query_params)).await
}
