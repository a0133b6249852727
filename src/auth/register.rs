//! This file defines the route for registering a new user.

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, Error, models::PasswordHash, stores::UserStore};

/// The state needed to register a new user.
#[derive(Clone)]
pub struct RegistrationState {
    /// The store the new user is inserted into.
    pub user_store: UserStore,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            user_store: UserStore::new(state.db_connection.clone()),
        }
    }
}

/// The data sent by the client when registering.
#[derive(Clone, Deserialize)]
pub struct RegisterData {
    /// The name the new user will log in with.
    #[serde(default)]
    pub username: Option<String>,
    /// The new user's email address.
    #[serde(default)]
    pub email: Option<String>,
    /// The new user's plaintext password. Only its hash is persisted.
    #[serde(default)]
    pub password: Option<String>,
}

/// Handler for registration requests via the POST method.
///
/// # Errors
///
/// This function will return a:
/// - [Error::Validation] if the username, email, or password is missing or empty,
/// - [Error::DuplicateUsername] or [Error::DuplicateEmail] if the username or
///   email is already in use,
/// - [Error::HashingError] if the password could not be hashed.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Json(data): Json<RegisterData>,
) -> Result<Response, Error> {
    let mut missing_fields = Vec::new();

    let username = non_empty_field(&data.username, "username", &mut missing_fields);
    let email = non_empty_field(&data.email, "email", &mut missing_fields);
    let password = non_empty_field(&data.password, "password", &mut missing_fields);

    if !missing_fields.is_empty() {
        return Err(Error::Validation(format!(
            "Missing required fields: {}",
            missing_fields.join(", ")
        )));
    }

    let password_hash = PasswordHash::from_raw_password(password, PasswordHash::DEFAULT_COST)?;

    let user = state.user_store.create(username, email, password_hash)?;
    tracing::info!("Registered user {} with ID {}", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    )
        .into_response())
}

/// Get the value of a required string field, recording its name in
/// `missing_fields` if the field is absent or empty.
fn non_empty_field<'a>(
    field: &'a Option<String>,
    name: &'static str,
    missing_fields: &mut Vec<&'static str>,
) -> &'a str {
    match field.as_deref() {
        Some(value) if !value.is_empty() => value,
        _ => {
            missing_fields.push(name);
            ""
        }
    }
}
