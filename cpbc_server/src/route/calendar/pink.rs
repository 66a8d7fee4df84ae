use axum::{extract::State, http::StatusCode, response::Response};
use cpbc_core::{event::CategoryBitmask, refresh::RefreshContext};

use crate::route::calendar::handle;

pub async fn handler(
    State(context): State<RefreshContext>,
) -> Result<Response, (StatusCode, String)> {
    handle(&context, CategoryBitmask::Normal).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::tests::{body_string, refreshed_context};

    #[tokio::test]
    async fn test_handler() {
        let response = handler(State(refreshed_context().await)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert_eq!(body.matches("BEGIN:VEVENT").count(), 1);
        assert!(body.contains("SUMMARY:pink"));
        assert!(!body.contains("SUMMARY:normal"));
    }
}
