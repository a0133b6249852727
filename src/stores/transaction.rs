//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, NewTransaction, Transaction, TransactionUpdate, UserID},
};

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction references a [User](crate::models::User),
/// the user table must be set up in the database.
///
/// All mutations are scoped by the owning user ID in a single SQL statement,
/// so the ownership check and the write cannot interleave with a concurrent
/// request for the same row.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl TransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Create a new transaction in the database.
    ///
    /// If `new_transaction` has no date, the transaction is dated with the
    /// current UTC date.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an unexpected SQL error, for
    /// example if the owning user does not exist.
    pub fn create(&self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        let date = new_transaction
            .date
            .unwrap_or_else(|| OffsetDateTime::now_utc().date());

        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO transactions (user_id, amount, category, description, date)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id, user_id, amount, category, description, date",
            )?
            .query_row(
                (
                    new_transaction.user_id.as_i64(),
                    new_transaction.amount,
                    &new_transaction.category,
                    &new_transaction.description,
                    date,
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn get(&self, id: DatabaseID) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, user_id, amount, category, description, date
                 FROM transactions WHERE id = :id",
            )?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(transaction)
    }

    /// Retrieve all transactions in the database.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an unexpected SQL error.
    pub fn get_all(&self) -> Result<Vec<Transaction>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT id, user_id, amount, category, description, date FROM transactions")?
            .query_map([], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
            .collect()
    }

    /// Apply `update` to the transaction with `id` owned by `user_id`.
    ///
    /// Fields that are `None` in `update` are left unchanged. The ownership
    /// check and the write happen in a single SQL statement.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no transaction with `id` is owned by `user_id`,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn update(
        &self,
        user_id: UserID,
        id: DatabaseID,
        update: &TransactionUpdate,
    ) -> Result<(), Error> {
        let rows_updated = self.connection.lock().unwrap().execute(
            "UPDATE transactions
             SET category = COALESCE(?1, category),
                 amount = COALESCE(?2, amount),
                 description = COALESCE(?3, description)
             WHERE id = ?4 AND user_id = ?5",
            (
                &update.category,
                update.amount,
                &update.description,
                id,
                user_id.as_i64(),
            ),
        )?;

        if rows_updated == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    /// Delete the transaction with `id` owned by `user_id`.
    ///
    /// The ownership check and the delete happen in a single SQL statement.
    /// The row is removed permanently.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no transaction with `id` is owned by `user_id`,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn delete(&self, user_id: UserID, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_deleted == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }
}

impl CreateTable for TransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS transactions (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    amount REAL NOT NULL,
                    category TEXT NOT NULL,
                    description TEXT,
                    date TEXT NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for TransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Transaction {
            id: row.get(offset)?,
            user_id: UserID::new(row.get(offset + 1)?),
            amount: row.get(offset + 2)?,
            category: row.get(offset + 3)?,
            description: row.get(offset + 4)?,
            date: row.get(offset + 5)?,
        })
    }
}

#[cfg(test)]
mod transaction_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        Error,
        db::initialize,
        models::{NewTransaction, PasswordHash, TransactionUpdate, UserID},
        stores::UserStore,
    };

    use super::TransactionStore;

    fn get_stores() -> (UserStore, TransactionStore) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        (
            UserStore::new(conn.clone()),
            TransactionStore::new(conn.clone()),
        )
    }

    fn insert_test_user(user_store: &UserStore, username: &str) -> UserID {
        user_store
            .create(
                username,
                &format!("{username}@x.com"),
                PasswordHash::new_unchecked("hunter2"),
            )
            .unwrap()
            .id
    }

    fn new_transaction(user_id: UserID) -> NewTransaction {
        NewTransaction {
            user_id,
            amount: 12.5,
            category: "food".to_owned(),
            description: Some("lunch".to_owned()),
            date: None,
        }
    }

    #[test]
    fn create_defaults_to_current_date() {
        let (user_store, transaction_store) = get_stores();
        let user_id = insert_test_user(&user_store, "alice");

        let transaction = transaction_store
            .create(new_transaction(user_id))
            .unwrap();

        assert!(transaction.id > 0);
        assert_eq!(transaction.user_id, user_id);
        assert_eq!(transaction.date, OffsetDateTime::now_utc().date());
    }

    #[test]
    fn create_uses_supplied_date() {
        let (user_store, transaction_store) = get_stores();
        let user_id = insert_test_user(&user_store, "alice");

        let transaction = transaction_store
            .create(NewTransaction {
                date: Some(date!(2024 - 03 - 09)),
                ..new_transaction(user_id)
            })
            .unwrap();

        assert_eq!(transaction.date, date!(2024 - 03 - 09));
    }

    #[test]
    fn get_fails_with_non_existent_id() {
        let (_, transaction_store) = get_stores();

        assert_eq!(transaction_store.get(42), Err(Error::NotFound));
    }

    #[test]
    fn get_returns_created_transaction() {
        let (user_store, transaction_store) = get_stores();
        let user_id = insert_test_user(&user_store, "alice");

        let created = transaction_store.create(new_transaction(user_id)).unwrap();
        let retrieved = transaction_store.get(created.id).unwrap();

        assert_eq!(retrieved, created);
    }

    #[test]
    fn update_applies_only_supplied_fields() {
        let (user_store, transaction_store) = get_stores();
        let user_id = insert_test_user(&user_store, "alice");
        let created = transaction_store.create(new_transaction(user_id)).unwrap();

        transaction_store
            .update(
                user_id,
                created.id,
                &TransactionUpdate {
                    amount: Some(99.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let updated = transaction_store.get(created.id).unwrap();
        assert_eq!(updated.amount, 99.0);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.description, created.description);
    }

    #[test]
    fn update_by_non_owner_fails_and_leaves_row_unchanged() {
        let (user_store, transaction_store) = get_stores();
        let alice = insert_test_user(&user_store, "alice");
        let bob = insert_test_user(&user_store, "bob");
        let created = transaction_store.create(new_transaction(alice)).unwrap();

        let result = transaction_store.update(
            bob,
            created.id,
            &TransactionUpdate {
                amount: Some(0.0),
                ..Default::default()
            },
        );

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(transaction_store.get(created.id).unwrap(), created);
    }

    #[test]
    fn delete_removes_row() {
        let (user_store, transaction_store) = get_stores();
        let user_id = insert_test_user(&user_store, "alice");
        let created = transaction_store.create(new_transaction(user_id)).unwrap();

        transaction_store.delete(user_id, created.id).unwrap();

        assert_eq!(transaction_store.get(created.id), Err(Error::NotFound));
    }

    #[test]
    fn delete_by_non_owner_fails_and_leaves_row() {
        let (user_store, transaction_store) = get_stores();
        let alice = insert_test_user(&user_store, "alice");
        let bob = insert_test_user(&user_store, "bob");
        let created = transaction_store.create(new_transaction(alice)).unwrap();

        let result = transaction_store.delete(bob, created.id);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(transaction_store.get(created.id).unwrap(), created);
    }

    #[test]
    fn delete_missing_transaction_fails() {
        let (user_store, transaction_store) = get_stores();
        let user_id = insert_test_user(&user_store, "alice");

        assert_eq!(
            transaction_store.delete(user_id, 42),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn racing_update_and_delete_leave_no_partial_row() {
        let (user_store, transaction_store) = get_stores();
        let user_id = insert_test_user(&user_store, "alice");

        for _ in 0..8 {
            let id = transaction_store
                .create(new_transaction(user_id))
                .unwrap()
                .id;

            let update_store = transaction_store.clone();
            let update_handle = std::thread::spawn(move || {
                update_store.update(
                    user_id,
                    id,
                    &TransactionUpdate {
                        amount: Some(99.0),
                        category: Some("travel".to_owned()),
                        ..Default::default()
                    },
                )
            });

            let delete_store = transaction_store.clone();
            let delete_handle = std::thread::spawn(move || delete_store.delete(user_id, id));

            let update_result = update_handle.join().unwrap();
            let delete_result = delete_handle.join().unwrap();

            // An update never removes the row, so the delete always finds it.
            assert_eq!(delete_result, Ok(()));
            // The update either ran first or found nothing, never in between.
            assert!(
                update_result == Ok(()) || update_result == Err(Error::NotFound),
                "unexpected update result: {update_result:?}"
            );
            assert_eq!(transaction_store.get(id), Err(Error::NotFound));
        }
    }

    #[test]
    fn get_all_returns_transactions_for_all_users() {
        let (user_store, transaction_store) = get_stores();
        let alice = insert_test_user(&user_store, "alice");
        let bob = insert_test_user(&user_store, "bob");

        transaction_store.create(new_transaction(alice)).unwrap();
        transaction_store.create(new_transaction(bob)).unwrap();

        let transactions = transaction_store.get_all().unwrap();

        assert_eq!(transactions.len(), 2);
    }
}
