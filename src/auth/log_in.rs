//! This file defines the route for handling log-in requests.
//! The rest of the auth module handles the lower level session and cookie logic.

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use serde::Deserialize;
use serde_json::json;
use time::Duration;

use crate::{
    AppState, Error,
    auth::cookie::set_auth_cookie,
    stores::UserStore,
};

/// The state needed to perform a log-in.
#[derive(Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The store used to look up the user by username.
    pub user_store: UserStore,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            user_store: UserStore::new(state.db_connection.clone()),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the client when logging in.
///
/// Missing fields are treated the same as incorrect credentials so that the
/// response does not reveal which part of the input was wrong.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// Username entered during log-in.
    #[serde(default)]
    pub username: Option<String>,
    /// Password entered during log-in.
    #[serde(default)]
    pub password: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On success the session cookie is set and a confirmation message returned.
///
/// # Errors
///
/// Returns an [Error::InvalidCredentials] if the username does not belong to a
/// registered user or the password does not verify against the stored hash.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Json(credentials): Json<LogInData>,
) -> Result<Response, Error> {
    let username = credentials.username.unwrap_or_default();
    let password = credentials.password.unwrap_or_default();

    let user = match state.user_store.get_by_username(&username) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    let is_password_valid = user
        .password_hash
        .verify(&password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((
        StatusCode::OK,
        jar,
        Json(json!({ "message": "Login successful" })),
    )
        .into_response())
}
