pub mod calendar;
pub mod events;
pub mod next;
pub mod refresh;
pub mod status;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use cpbc_core::refresh::RefreshContext;

pub fn router(context: RefreshContext) -> Router {
    Router::new()
        .route("/calendar", get(calendar::handler))
        .route("/calendar/pink", get(calendar::pink::handler))
        .route("/calendar/normal", get(calendar::normal::handler))
        .route("/events", get(events::handler))
        .route("/next", get(next::handler))
        .route("/status", get(status::handler))
        .route("/validation", get(validation::handler))
        .route("/refresh", post(refresh::handler))
        .with_state(context)
}

#[cfg(test)]
pub mod tests {
    use axum::{body::HttpBody, response::Response};
    use chrono::{TimeZone, Utc};
    use cpbc_core::{
        event::{Category, CollectionEvent},
        refresh::RefreshContext,
        refuse_client::{RefuseClient, DEFAULT_TIMEOUT, DEFAULT_TIMEZONE},
    };

    pub fn empty_context() -> RefreshContext {
        let client = RefuseClient::new(DEFAULT_TIMEOUT, DEFAULT_TIMEZONE).unwrap();
        RefreshContext::new(client, "101".to_string(), Some("Main Street".to_string()))
    }

    /// Collections on 10 and 24 July 2024, London time.
    pub fn events() -> Vec<CollectionEvent> {
        vec![
            CollectionEvent {
                category: Category::Pink,
                start: Utc.with_ymd_and_hms(2024, 7, 9, 23, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2024, 7, 10, 23, 0, 0).unwrap(),
            },
            CollectionEvent {
                category: Category::Normal,
                start: Utc.with_ymd_and_hms(2024, 7, 23, 23, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2024, 7, 24, 23, 0, 0).unwrap(),
            },
        ]
    }

    pub async fn refreshed_context() -> RefreshContext {
        let context = empty_context();
        context.apply(Ok(events())).await.unwrap();
        context
    }

    pub async fn body_string(response: Response) -> String {
        let mut body = response.into_body();
        let mut bytes = Vec::new();
        while let Some(chunk) = body.data().await {
            bytes.extend_from_slice(&chunk.unwrap());
        }
        String::from_utf8(bytes).unwrap()
    }
}
