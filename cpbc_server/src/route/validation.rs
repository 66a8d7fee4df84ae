use axum::{extract::State, Json};
use cpbc_core::{directory::ValidationState, refresh::RefreshContext};
use serde::Serialize;

/// Whether the configured road id still matches the council's road list.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResponse {
    pub road_id: String,
    pub road_name: Option<String>,
    pub state: &'static str,
    pub reason: Option<String>,
}

pub async fn handler(State(context): State<RefreshContext>) -> Json<ValidationResponse> {
    let snapshot = context.snapshot().await;
    let reason = match &snapshot.validation {
        ValidationState::Fail(mismatch) => Some(mismatch.to_string()),
        _ => None,
    };
    Json(ValidationResponse {
        road_id: context.road_id().to_string(),
        road_name: context.road_name().map(String::from),
        state: snapshot.validation.label(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use cpbc_core::directory::Road;

    use super::*;
    use crate::route::tests::empty_context;

    #[tokio::test]
    async fn test_handler() {
        let context = empty_context();
        let Json(validation) = handler(State(context.clone())).await;
        assert_eq!(validation.road_id, "101");
        assert_eq!(validation.road_name.as_deref(), Some("Main Street"));
        assert_eq!(validation.state, "unknown");
        assert_eq!(validation.reason, None);

        context
            .apply_validation(&[Road::new("Main Street", "101")])
            .await;
        let Json(validation) = handler(State(context.clone())).await;
        assert_eq!(validation.state, "pass");
        assert_eq!(validation.reason, None);

        context.apply_validation(&[Road::new("Elm Road", "102")]).await;
        let Json(validation) = handler(State(context)).await;
        assert_eq!(validation.state, "fail");
        assert_eq!(validation.reason.as_deref(), Some("road id 101 is not listed by the council"));
    }
}
