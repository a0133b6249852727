//! This file defines the type `Budget`, a spending limit for a category over a date range.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::models::{DatabaseID, UserID};

/// A spending limit for a category of transactions over a date range.
///
/// The date range is not validated: `start_date` may be later than `end_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    #[serde(rename = "BudgetID")]
    pub id: DatabaseID,

    /// The ID of the user that owns this budget.
    #[serde(rename = "UserID")]
    pub user_id: UserID,

    /// The maximum amount of money to spend.
    #[serde(rename = "Amount")]
    pub amount: f64,

    /// The category of transactions the budget applies to.
    #[serde(rename = "Category")]
    pub category: String,

    /// The first day the budget applies to.
    #[serde(rename = "StartDate", with = "crate::models::date_format")]
    pub start_date: Date,

    /// The last day the budget applies to.
    #[serde(rename = "EndDate", with = "crate::models::date_format")]
    pub end_date: Date,
}

/// The data needed to insert a new budget for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The ID of the user that will own the budget.
    pub user_id: UserID,
    /// The maximum amount of money to spend.
    pub amount: f64,
    /// The category of transactions the budget applies to.
    pub category: String,
    /// The first day the budget applies to.
    pub start_date: Date,
    /// The last day the budget applies to.
    pub end_date: Date,
}
