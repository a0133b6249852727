//! Contains SQLite backed stores for the domain [models](crate::models).

mod budget;
mod transaction;
mod user;

pub use budget::BudgetStore;
pub use transaction::TransactionStore;
pub use user::UserStore;
