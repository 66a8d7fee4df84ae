use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use cpbc_core::{directory::ValidationState, refresh::RefreshContext};
use serde::Serialize;

/// Health of the configured road: refresh outcome and directory validation.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub road_id: String,
    pub road_name: Option<String>,
    pub validation: &'static str,
    pub validation_reason: Option<String>,
    pub events: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

pub async fn handler(State(context): State<RefreshContext>) -> Json<StatusResponse> {
    let snapshot = context.snapshot().await;
    let validation_reason = match &snapshot.validation {
        ValidationState::Fail(mismatch) => Some(mismatch.to_string()),
        _ => None,
    };
    Json(StatusResponse {
        road_id: context.road_id().to_string(),
        road_name: context.road_name().map(String::from),
        validation: snapshot.validation.label(),
        validation_reason,
        events: snapshot.events.len(),
        refreshed_at: snapshot.refreshed_at,
        last_error: snapshot.last_error,
    })
}

#[cfg(test)]
mod tests {
    use cpbc_core::directory::Road;

    use super::*;
    use crate::route::tests::{empty_context, refreshed_context};

    #[tokio::test]
    async fn test_handler_before_first_refresh() {
        let Json(status) = handler(State(empty_context())).await;
        assert_eq!(status.road_id, "101");
        assert_eq!(status.validation, "unknown");
        assert_eq!(status.events, 0);
        assert!(status.refreshed_at.is_none());
    }

    #[tokio::test]
    async fn test_handler_validation() {
        let context = refreshed_context().await;
        context
            .apply_validation(&[Road::new("Main Street", "101"), Road::new("Elm Road", "102")])
            .await;
        let Json(status) = handler(State(context.clone())).await;
        assert_eq!(status.validation, "pass");
        assert_eq!(status.validation_reason, None);
        assert_eq!(status.events, 2);
        assert!(status.refreshed_at.is_some());

        context
            .apply_validation(&[Road::new("Elm Road", "101")])
            .await;
        let Json(status) = handler(State(context)).await;
        assert_eq!(status.validation, "fail");
        assert_eq!(
            status.validation_reason.as_deref(),
            Some("road id 101 belongs to \"Elm Road\", not \"Main Street\"")
        );
    }
}
