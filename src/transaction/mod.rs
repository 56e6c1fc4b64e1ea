//! Transaction management for the expense tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and its enumerated fields
//! - The repository trait and its SQLite implementation
//! - The service that validates input and computes totals
//! - The JSON endpoints that expose the service over HTTP

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod query_endpoint;
mod repository;
mod service;
mod summary_endpoint;

use axum::extract::FromRef;

use crate::AppState;

pub use self::core::{
    Category, NewTransaction, ParseEnumError, Status, Transaction, TransactionType,
    TransactionUpdate,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::{DeleteMode, delete_transaction_endpoint};
pub use edit_endpoint::edit_transaction_endpoint;
pub use query_endpoint::{get_transaction_endpoint, get_transactions_endpoint};
pub use repository::{
    RepositoryError, SQLiteTransactionRepository, TransactionRepository,
    create_transaction_table,
};
pub use service::{
    CreateTransactionRequest, TransactionService, UpdateTransactionRequest,
};
pub use summary_endpoint::{get_net_income_endpoint, get_total_by_type_endpoint};

/// The transaction service backed by the application's SQLite database.
pub type SQLiteTransactionService = TransactionService<SQLiteTransactionRepository>;

/// The state needed by the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The service that all transaction endpoints delegate to.
    pub service: SQLiteTransactionService,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            service: TransactionService::new(SQLiteTransactionRepository::new(
                state.db_connection.clone(),
            )),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::initialize_db;

    use super::{SQLiteTransactionRepository, TransactionService, TransactionState};

    pub(crate) use super::repository::test_utils::set_transaction_date;

    /// Create endpoint state backed by an empty in-memory database.
    ///
    /// The connection is returned as well so that tests can inspect or
    /// rearrange the stored rows.
    pub(crate) fn must_create_test_state() -> (TransactionState, Arc<Mutex<Connection>>) {
        let connection = Connection::open_in_memory().expect("could not open test database");
        initialize_db(&connection).expect("could not initialize test database");
        let connection = Arc::new(Mutex::new(connection));

        let state = TransactionState {
            service: TransactionService::new(SQLiteTransactionRepository::new(
                connection.clone(),
            )),
        };

        (state, connection)
    }
}
