//! Implements a SQLite backed user store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{PasswordHash, User, UserID},
};

/// Handles the creation and retrieval of User objects in a SQLite database.
#[derive(Debug, Clone)]
pub struct UserStore {
    connection: Arc<Mutex<Connection>>,
}

impl UserStore {
    /// Create a new user store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Create and insert a new user into the database.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::DuplicateUsername] if the given username is already in use,
    /// - [Error::DuplicateEmail] if the given email address is already in use,
    /// - [Error::SqlError] if there was an unexpected SQL error.
    pub fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: PasswordHash,
    ) -> Result<User, Error> {
        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)",
            (username, email, password_hash.as_ref()),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(User::new(
            id,
            username.to_owned(),
            email.to_owned(),
            password_hash,
        ))
    }

    /// Get the user from the database that has the specified `id`, or return [Error::NotFound] if
    /// such user does not exist.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    ///
    /// Returns a [Error::NotFound] error if there is no user with the specified ID or
    /// [Error::SqlError] if there are SQL related errors.
    pub fn get(&self, id: UserID) -> Result<User, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT id, username, email, password FROM users WHERE id = :id")?
            .query_row(&[(":id", &id.as_i64())], Self::map_row)
            .map_err(|error| error.into())
    }

    /// Get the user from the database that has the specified `username`, or return
    /// [Error::NotFound] if such user does not exist.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    ///
    /// Returns a [Error::NotFound] error if there is no user with the specified username or
    /// [Error::SqlError] if there are SQL related errors.
    pub fn get_by_username(&self, username: &str) -> Result<User, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT id, username, email, password FROM users WHERE username = :username")?
            .query_row(&[(":username", &username)], Self::map_row)
            .map_err(|error| error.into())
    }

    /// Get all users in the database.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or is poisoned.
    ///
    /// # Errors
    ///
    /// Returns a [Error::SqlError] if an SQL related error occurred.
    pub fn get_all(&self) -> Result<Vec<User>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT id, username, email, password FROM users")?
            .query_map([], Self::map_row)?
            .map(|maybe_user| maybe_user.map_err(|error| error.into()))
            .collect()
    }
}

impl CreateTable for UserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY,
                    username TEXT UNIQUE NOT NULL,
                    email TEXT UNIQUE NOT NULL,
                    password TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for UserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_id = row.get(offset)?;
        let username: String = row.get(offset + 1)?;
        let email: String = row.get(offset + 2)?;
        let raw_password_hash: String = row.get(offset + 3)?;

        let id = UserID::new(raw_id);
        let password_hash = PasswordHash::new_unchecked(&raw_password_hash);

        Ok(User::new(id, username, email, password_hash))
    }
}

#[cfg(test)]
mod user_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error,
        db::CreateTable,
        models::{PasswordHash, UserID},
    };

    use super::UserStore;

    fn get_store() -> UserStore {
        let conn = Connection::open_in_memory().unwrap();
        UserStore::create_table(&conn).unwrap();

        UserStore::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn insert_user_succeeds() {
        let store = get_store();

        let password_hash = PasswordHash::new_unchecked("hunter2");
        let inserted_user = store
            .create("alice", "alice@x.com", password_hash.clone())
            .unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.username, "alice");
        assert_eq!(inserted_user.email, "alice@x.com");
        assert_eq!(inserted_user.password_hash, password_hash);
    }

    #[test]
    fn insert_user_fails_on_duplicate_username() {
        let store = get_store();

        store
            .create("alice", "alice@x.com", PasswordHash::new_unchecked("hunter2"))
            .unwrap();

        let result = store.create(
            "alice",
            "other@x.com",
            PasswordHash::new_unchecked("hunter3"),
        );

        assert_eq!(result, Err(Error::DuplicateUsername));
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let store = get_store();

        store
            .create("alice", "alice@x.com", PasswordHash::new_unchecked("hunter2"))
            .unwrap();

        let result = store.create(
            "bob",
            "alice@x.com",
            PasswordHash::new_unchecked("hunter3"),
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn duplicate_username_leaves_one_persisted_user() {
        let store = get_store();

        store
            .create("alice", "alice@x.com", PasswordHash::new_unchecked("hunter2"))
            .unwrap();
        let _ = store.create(
            "alice",
            "other@x.com",
            PasswordHash::new_unchecked("hunter3"),
        );

        let users = store.get_all().unwrap();
        assert_eq!(users.len(), 1, "want exactly one user, got {}", users.len());
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let store = get_store();

        assert_eq!(store.get(UserID::new(42)), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let store = get_store();

        let test_user = store
            .create("alice", "alice@x.com", PasswordHash::new_unchecked("hunter2"))
            .unwrap();

        let retrieved_user = store.get(test_user.id).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_username_succeeds() {
        let store = get_store();

        let test_user = store
            .create("alice", "alice@x.com", PasswordHash::new_unchecked("hunter2"))
            .unwrap();

        let retrieved_user = store.get_by_username("alice").unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_username_fails_for_unknown_name() {
        let store = get_store();

        assert_eq!(store.get_by_username("nobody"), Err(Error::NotFound));
    }
}
