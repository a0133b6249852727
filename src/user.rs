//! This file defines the routes for retrieving users.

use axum::{
    Json,
    extract::{FromRef, Path, State},
};

use crate::{
    AppState, Error,
    models::{User, UserID},
    stores::UserStore,
};

/// The state needed to retrieve users.
#[derive(Clone)]
pub struct UserApiState {
    /// The store users are read from.
    pub user_store: UserStore,
}

impl FromRef<AppState> for UserApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            user_store: UserStore::new(state.db_connection.clone()),
        }
    }
}

/// Handler for listing all users.
///
/// Password hashes are not serialized, so the response only contains each
/// user's ID, username, and email.
pub async fn get_users(State(state): State<UserApiState>) -> Result<Json<Vec<User>>, Error> {
    let users = state.user_store.get_all()?;

    Ok(Json(users))
}

/// Handler for retrieving a single user by ID.
///
/// # Errors
///
/// Returns an [Error::NotFound] if no user has the given ID.
pub async fn get_user(
    State(state): State<UserApiState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, Error> {
    let user = state.user_store.get(UserID::new(user_id))?;

    Ok(Json(user))
}
