//! User authentication: registration, log-in, and session cookie handling.

mod cookie;
mod log_in;
mod log_out;
mod register;
mod session;
mod token;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use register::register_user;
pub use session::{AuthState, AuthenticatedUser};
pub(crate) use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
