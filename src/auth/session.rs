//! Session resolution for protected routes.
//!
//! Protected handlers receive the acting user explicitly through the
//! [AuthenticatedUser] extractor rather than reading it from ambient state.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{AppState, Error, auth::cookie::get_token_from_cookies, models::UserID};

/// The state needed to resolve a session cookie.
///
/// Session expiry lives inside the token itself, so resolution only needs the
/// key to decrypt the cookie.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// The user identity resolved from the request's session cookie.
///
/// Using this extractor makes a route handler require authentication: requests
/// without a valid, unexpired session cookie are rejected with a 401 response
/// before the handler body runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AuthenticatedUser(pub UserID);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let jar = match PrivateCookieJar::from_request_parts(parts, &auth_state).await {
            Ok(jar) => jar,
            Err(error) => {
                tracing::error!("Error getting cookie jar: {error:?}");
                return Err(Error::Unauthenticated);
            }
        };

        let token = get_token_from_cookies(&jar)?;

        Ok(Self(token.user_id))
    }
}
