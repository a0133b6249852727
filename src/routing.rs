//! Assembles the route handlers into the application's [axum::Router].

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, Error,
    auth::{post_log_in, post_log_out, register_user},
    budget::{create_budget, get_budget, get_budgets},
    endpoints,
    transaction::{
        create_transaction, delete_transaction, get_transaction, get_transactions,
        update_transaction,
    },
    user::{get_user, get_users},
};

/// Return a router with all the app's routes.
///
/// Handlers that mutate data extract the acting user from the session cookie
/// and reject requests without one, so public and protected methods can share
/// a path.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(endpoints::USERS, get(get_users))
        .route(endpoints::USER, get(get_user))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions).post(create_transaction),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route(endpoints::BUDGETS, get(get_budgets).post(create_budget))
        .route(endpoints::BUDGET, get(get_budget))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
