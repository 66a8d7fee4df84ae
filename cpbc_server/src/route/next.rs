use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use cpbc_core::{
    chrono_tz::Tz,
    event::CollectionEvent,
    projection::{next_collection, next_event, NextCollection},
    refresh::RefreshContext,
};
use serde::Serialize;

/// The "next collection" sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextResponse {
    pub collection: Option<NextCollection>,
    pub event: Option<CollectionEvent>,
}

fn next_response(events: &[CollectionEvent], now: DateTime<Utc>, timezone: Tz) -> NextResponse {
    NextResponse {
        collection: next_collection(events, now, timezone),
        event: next_event(events, now).cloned(),
    }
}

pub async fn handler(State(context): State<RefreshContext>) -> Json<NextResponse> {
    let events = context.events().await;
    Json(next_response(&events, Utc::now(), context.timezone()))
}
