/*! This module defines and implements traits for interacting with the application's database. */

use rusqlite::{Connection, Row};

use crate::{
    Error,
    stores::{BudgetStore, TransactionStore, UserStore},
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    /// The type that the row is mapped to.
    type ReturnType;

    /// Map a row to the concrete type, assuming the columns start at index zero.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Map a row to the concrete type with the first column at `offset`.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Set up the application database by creating the tables for the domain models.
///
/// Enables foreign key enforcement so that transactions and budgets must
/// reference a valid user.
///
/// # Errors
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    UserStore::create_table(connection)?;
    TransactionStore::create_table(connection)?;
    BudgetStore::create_table(connection)?;

    Ok(())
}
