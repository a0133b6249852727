//! This file defines the route for logging out the current user.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::auth::cookie::invalidate_auth_cookie;

/// Handler for log-out requests via the POST method.
///
/// Invalidates the session cookie. Always succeeds, even if the client was not
/// logged in.
pub async fn post_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (
        StatusCode::OK,
        jar,
        Json(json!({ "message": "Logout successful" })),
    )
        .into_response()
}
