use axum::{extract::State, http::StatusCode, response::Response};
use cpbc_core::{event::CategoryBitmask, refresh::RefreshContext};

use crate::route::calendar::handle;

pub async fn handler(
    State(context): State<RefreshContext>,
) -> Result<Response, (StatusCode, String)> {
    handle(&context, CategoryBitmask::Pink).await
}
