//! This file defines the routes for listing, creating, and retrieving budgets.
//!
//! Listing and fetching by ID are public. Creating a budget requires a session,
//! and the budget is owned by the acting user. Budgets cannot be updated or
//! deleted through the API.

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::AuthenticatedUser,
    models::{Budget, DatabaseID, NewBudget},
    stores::BudgetStore,
    transaction::parse_wire_date,
};

/// The state needed to access budgets.
#[derive(Clone)]
pub struct BudgetApiState {
    /// The store budgets are read from and written to.
    pub budget_store: BudgetStore,
}

impl FromRef<AppState> for BudgetApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            budget_store: BudgetStore::new(state.db_connection.clone()),
        }
    }
}

/// The data sent by the client when creating a budget.
#[derive(Clone, Deserialize)]
pub struct CreateBudgetData {
    /// The category the budget applies to.
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    /// The spending limit for the period.
    #[serde(rename = "Amount", default)]
    pub amount: Option<f64>,
    /// The first day of the budget period, formatted as `MM-DD-YYYY`.
    #[serde(rename = "StartDate", default)]
    pub start_date: Option<String>,
    /// The last day of the budget period, formatted as `MM-DD-YYYY`.
    #[serde(rename = "EndDate", default)]
    pub end_date: Option<String>,
}

/// Handler for listing all budgets.
pub async fn get_budgets(State(state): State<BudgetApiState>) -> Result<Json<Vec<Budget>>, Error> {
    let budgets = state.budget_store.get_all()?;

    Ok(Json(budgets))
}

/// Handler for retrieving a single budget by ID.
///
/// # Errors
///
/// Returns an [Error::NotFound] if no budget has the given ID.
pub async fn get_budget(
    State(state): State<BudgetApiState>,
    Path(budget_id): Path<DatabaseID>,
) -> Result<Json<Budget>, Error> {
    let budget = state.budget_store.get(budget_id)?;

    Ok(Json(budget))
}

/// Handler for creating a budget owned by the acting user.
///
/// Responds with the created budget, including its assigned ID.
///
/// # Errors
///
/// This function will return a:
/// - [Error::Unauthenticated] if the request has no valid session,
/// - [Error::Validation] if the category, amount, or either date is missing,
///   or a date is malformed.
pub async fn create_budget(
    State(state): State<BudgetApiState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(data): Json<CreateBudgetData>,
) -> Result<Response, Error> {
    let mut missing_fields = Vec::new();

    match data.category.as_deref() {
        Some(category) if !category.is_empty() => {}
        _ => missing_fields.push("Category"),
    }
    if data.amount.is_none() {
        missing_fields.push("Amount");
    }
    if data.start_date.is_none() {
        missing_fields.push("StartDate");
    }
    if data.end_date.is_none() {
        missing_fields.push("EndDate");
    }

    if !missing_fields.is_empty() {
        return Err(Error::Validation(format!(
            "Missing required fields: {}",
            missing_fields.join(", ")
        )));
    }

    let start_date = parse_wire_date(data.start_date.as_deref().unwrap_or_default())?;
    let end_date = parse_wire_date(data.end_date.as_deref().unwrap_or_default())?;

    let budget = state.budget_store.create(NewBudget {
        user_id,
        amount: data.amount.unwrap_or_default(),
        category: data.category.unwrap_or_default(),
        start_date,
        end_date,
    })?;

    Ok((StatusCode::CREATED, Json(budget)).into_response())
}
