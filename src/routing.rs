//! Application router configuration.

use axum::{
    Router, middleware,
    routing::get,
};

use crate::{
    AppState, endpoints,
    health::get_health,
    logging::logging_middleware,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_net_income_endpoint, get_total_by_type_endpoint, get_transaction_endpoint,
        get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .patch(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::SUMMARY_BY_TYPE, get(get_total_by_type_endpoint))
        .route(endpoints::SUMMARY_NET, get(get_net_income_endpoint))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
