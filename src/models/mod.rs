//! Defines the domain models of the application and their supporting types.

mod budget;
mod password;
mod transaction;
mod user;

pub use budget::{Budget, NewBudget};
pub use password::PasswordHash;
pub use transaction::{NewTransaction, Transaction, TransactionUpdate};
pub use user::{User, UserID};

/// Alias for the integer type used for database row IDs.
pub type DatabaseID = i64;

pub(crate) mod date_format {
    //! Specifies how to serialize a [time::Date] in the `MM-DD-YYYY` format
    //! used on the wire, e.g. "01-31-2024".

    use serde::{Deserialize, Deserializer, Serializer};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    /// The wire format for dates, e.g. "01-31-2024".
    pub const DATE_FORMAT: &[BorrowedFormatItem] =
        format_description!("[month]-[day]-[year]");

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }

    /// Parse a `MM-DD-YYYY` date string from a request body.
    pub fn parse(raw: &str) -> Result<Date, time::error::Parse> {
        Date::parse(raw, DATE_FORMAT)
    }
}
