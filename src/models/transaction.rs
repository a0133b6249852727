//! This file defines the type `Transaction`, an expense or income recorded by a user.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::models::{DatabaseID, UserID};

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The field names on the wire (`TransactionID`, `Category`, ...) match the
/// public API contract rather than the Rust naming convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    #[serde(rename = "TransactionID")]
    pub id: DatabaseID,

    /// The ID of the user that owns this transaction.
    #[serde(rename = "UserID")]
    pub user_id: UserID,

    /// The amount of money spent or earned in this transaction.
    #[serde(rename = "Amount")]
    pub amount: f64,

    /// A user-defined category that describes the type of the transaction.
    #[serde(rename = "Category")]
    pub category: String,

    /// A text description of what the transaction was for.
    #[serde(rename = "Description")]
    pub description: Option<String>,

    /// When the transaction happened. Defaults to the creation date.
    #[serde(rename = "Date", with = "crate::models::date_format")]
    pub date: Date,
}

/// The data needed to insert a new transaction for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The ID of the user that will own the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// A user-defined category.
    pub category: String,
    /// A text description of the transaction.
    pub description: Option<String>,
    /// When the transaction happened. `None` means the creation date is used.
    pub date: Option<Date>,
}

/// A partial update to a transaction.
///
/// Fields set to `None` are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// The new category, if any.
    pub category: Option<String>,
    /// The new amount, if any.
    pub amount: Option<f64>,
    /// The new description, if any.
    pub description: Option<String>,
}

#[cfg(test)]
mod transaction_tests {
    use time::macros::date;

    use crate::models::UserID;

    use super::Transaction;

    #[test]
    fn serializes_with_wire_field_names() {
        let transaction = Transaction {
            id: 1,
            user_id: UserID::new(2),
            amount: 12.5,
            category: "food".to_owned(),
            description: Some("lunch".to_owned()),
            date: date!(2024 - 03 - 09),
        };

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["TransactionID"], 1);
        assert_eq!(json["UserID"], 2);
        assert_eq!(json["Amount"], 12.5);
        assert_eq!(json["Category"], "food");
        assert_eq!(json["Description"], "lunch");
        assert_eq!(json["Date"], "03-09-2024");
    }
}
