//! Implements a SQLite backed budget store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Budget, DatabaseID, NewBudget, UserID},
};

/// Stores budgets in a SQLite database.
///
/// Note that because a budget references a [User](crate::models::User),
/// the user table must be set up in the database.
#[derive(Debug, Clone)]
pub struct BudgetStore {
    connection: Arc<Mutex<Connection>>,
}

impl BudgetStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Create a new budget in the database.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an unexpected SQL error, for
    /// example if the owning user does not exist.
    pub fn create(&self, new_budget: NewBudget) -> Result<Budget, Error> {
        let budget = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO budgets (user_id, amount, category, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id, user_id, amount, category, start_date, end_date",
            )?
            .query_row(
                (
                    new_budget.user_id.as_i64(),
                    new_budget.amount,
                    &new_budget.category,
                    new_budget.start_date,
                    new_budget.end_date,
                ),
                Self::map_row,
            )?;

        Ok(budget)
    }

    /// Retrieve a budget in the database by its `id`.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid budget,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn get(&self, id: DatabaseID) -> Result<Budget, Error> {
        let budget = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, user_id, amount, category, start_date, end_date
                 FROM budgets WHERE id = :id",
            )?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(budget)
    }

    /// Retrieve all budgets in the database.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an unexpected SQL error.
    pub fn get_all(&self) -> Result<Vec<Budget>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT id, user_id, amount, category, start_date, end_date FROM budgets")?
            .query_map([], Self::map_row)?
            .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
            .collect()
    }
}

impl CreateTable for BudgetStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS budgets (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    amount REAL NOT NULL,
                    category TEXT NOT NULL,
                    start_date TEXT NOT NULL,
                    end_date TEXT NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for BudgetStore {
    type ReturnType = Budget;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Budget {
            id: row.get(offset)?,
            user_id: UserID::new(row.get(offset + 1)?),
            amount: row.get(offset + 2)?,
            category: row.get(offset + 3)?,
            start_date: row.get(offset + 4)?,
            end_date: row.get(offset + 5)?,
        })
    }
}

#[cfg(test)]
mod budget_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        models::{NewBudget, PasswordHash, UserID},
        stores::UserStore,
    };

    use super::BudgetStore;

    fn get_stores() -> (UserStore, BudgetStore) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        (UserStore::new(conn.clone()), BudgetStore::new(conn.clone()))
    }

    fn insert_test_user(user_store: &UserStore) -> UserID {
        user_store
            .create(
                "alice",
                "alice@x.com",
                PasswordHash::new_unchecked("hunter2"),
            )
            .unwrap()
            .id
    }

    fn new_budget(user_id: UserID) -> NewBudget {
        NewBudget {
            user_id,
            amount: 500.0,
            category: "groceries".to_owned(),
            start_date: date!(2024 - 01 - 01),
            end_date: date!(2024 - 01 - 31),
        }
    }

    #[test]
    fn create_then_get_round_trips() {
        let (user_store, budget_store) = get_stores();
        let user_id = insert_test_user(&user_store);

        let created = budget_store.create(new_budget(user_id)).unwrap();
        let retrieved = budget_store.get(created.id).unwrap();

        assert!(created.id > 0);
        assert_eq!(retrieved, created);
        assert_eq!(retrieved.start_date, date!(2024 - 01 - 01));
        assert_eq!(retrieved.end_date, date!(2024 - 01 - 31));
    }

    #[test]
    fn get_fails_with_non_existent_id() {
        let (_, budget_store) = get_stores();

        assert_eq!(budget_store.get(42), Err(Error::NotFound));
    }

    #[test]
    fn inverted_date_range_is_not_rejected() {
        // There is deliberately no start <= end validation, matching the API contract.
        let (user_store, budget_store) = get_stores();
        let user_id = insert_test_user(&user_store);

        let result = budget_store.create(NewBudget {
            start_date: date!(2024 - 02 - 01),
            end_date: date!(2024 - 01 - 01),
            ..new_budget(user_id)
        });

        assert!(result.is_ok());
    }

    #[test]
    fn get_all_returns_every_budget() {
        let (user_store, budget_store) = get_stores();
        let user_id = insert_test_user(&user_store);

        budget_store.create(new_budget(user_id)).unwrap();
        budget_store
            .create(NewBudget {
                category: "fuel".to_owned(),
                ..new_budget(user_id)
            })
            .unwrap();

        let budgets = budget_store.get_all().unwrap();

        assert_eq!(budgets.len(), 2);
    }
}
