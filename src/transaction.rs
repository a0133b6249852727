//! This file defines the routes for listing, creating, updating, and deleting transactions.
//!
//! Listing and fetching by ID are public. Mutations require a session, and the
//! acting user resolved from that session scopes every write: a transaction
//! owned by another user is indistinguishable from one that does not exist.

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    auth::AuthenticatedUser,
    models::{DatabaseID, NewTransaction, Transaction, TransactionUpdate},
    stores::TransactionStore,
};

/// The state needed to access transactions.
#[derive(Clone)]
pub struct TransactionApiState {
    /// The store transactions are read from and written to.
    pub transaction_store: TransactionStore,
}

impl FromRef<AppState> for TransactionApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: TransactionStore::new(state.db_connection.clone()),
        }
    }
}

/// The data sent by the client when creating a transaction.
///
/// Field names match the wire format. Fields are optional here so that missing
/// ones can be reported with a validation error instead of a generic
/// deserialization failure.
#[derive(Clone, Deserialize)]
pub struct CreateTransactionData {
    /// A user-defined category.
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    /// The amount of money spent or earned.
    #[serde(rename = "Amount", default)]
    pub amount: Option<f64>,
    /// A text description of the transaction.
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    /// When the transaction happened, formatted as `MM-DD-YYYY`.
    /// Defaults to the current date if omitted.
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
}

/// The data sent by the client when updating a transaction.
///
/// Omitted fields are left unchanged.
#[derive(Clone, Deserialize)]
pub struct UpdateTransactionData {
    /// The new category, if any.
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    /// The new amount, if any.
    #[serde(rename = "Amount", default)]
    pub amount: Option<f64>,
    /// The new description, if any.
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

/// Handler for listing all transactions.
pub async fn get_transactions(
    State(state): State<TransactionApiState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let transactions = state.transaction_store.get_all()?;

    Ok(Json(transactions))
}

/// Handler for retrieving a single transaction by ID.
///
/// # Errors
///
/// Returns an [Error::NotFound] if no transaction has the given ID.
pub async fn get_transaction(
    State(state): State<TransactionApiState>,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<Transaction>, Error> {
    let transaction = state.transaction_store.get(transaction_id)?;

    Ok(Json(transaction))
}

/// Handler for creating a transaction owned by the acting user.
///
/// # Errors
///
/// This function will return a:
/// - [Error::Unauthenticated] if the request has no valid session,
/// - [Error::Validation] if the category, amount, or description is missing,
///   or the date is malformed.
pub async fn create_transaction(
    State(state): State<TransactionApiState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(data): Json<CreateTransactionData>,
) -> Result<Response, Error> {
    let mut missing_fields = Vec::new();

    match data.category.as_deref() {
        Some(category) if !category.is_empty() => {}
        _ => missing_fields.push("Category"),
    }
    if data.amount.is_none() {
        missing_fields.push("Amount");
    }
    if data.description.is_none() {
        missing_fields.push("Description");
    }

    if !missing_fields.is_empty() {
        return Err(Error::Validation(format!(
            "Missing required fields: {}",
            missing_fields.join(", ")
        )));
    }

    let date = data.date.as_deref().map(parse_wire_date).transpose()?;

    state.transaction_store.create(NewTransaction {
        user_id,
        amount: data.amount.unwrap_or_default(),
        category: data.category.unwrap_or_default(),
        description: data.description,
        date,
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Transaction created successfully" })),
    )
        .into_response())
}

/// Handler for updating a transaction owned by the acting user.
///
/// Only the supplied fields are changed.
///
/// # Errors
///
/// This function will return a:
/// - [Error::Unauthenticated] if the request has no valid session,
/// - [Error::NotFound] if the transaction does not exist or belongs to
///   another user.
pub async fn update_transaction(
    State(state): State<TransactionApiState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(transaction_id): Path<DatabaseID>,
    Json(data): Json<UpdateTransactionData>,
) -> Result<Response, Error> {
    state.transaction_store.update(
        user_id,
        transaction_id,
        &TransactionUpdate {
            category: data.category,
            amount: data.amount,
            description: data.description,
        },
    )?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Transaction updated successfully" })),
    )
        .into_response())
}

/// Handler for deleting a transaction owned by the acting user.
///
/// The row is removed permanently.
///
/// # Errors
///
/// This function will return a:
/// - [Error::Unauthenticated] if the request has no valid session,
/// - [Error::NotFound] if the transaction does not exist or belongs to
///   another user.
pub async fn delete_transaction(
    State(state): State<TransactionApiState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Response, Error> {
    state.transaction_store.delete(user_id, transaction_id)?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Transaction deleted successfully" })),
    )
        .into_response())
}

/// Parse a `MM-DD-YYYY` date from a request body.
pub(crate) fn parse_wire_date(raw: &str) -> Result<time::Date, Error> {
    crate::models::date_format::parse(raw)
        .map_err(|_| Error::Validation(format!("Invalid date '{raw}', expected MM-DD-YYYY")))
}
