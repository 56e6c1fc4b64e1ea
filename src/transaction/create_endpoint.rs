use axum::{Json, extract::State, http::StatusCode};

use crate::{
    Error,
    extract::ApiJson,
    transaction::{CreateTransactionRequest, Transaction, TransactionState},
};

/// A route handler for recording a new transaction, responds with the stored
/// transaction and `201 Created`.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    ApiJson(request): ApiJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let transaction = state.service.add_transaction(request)?;

    tracing::info!("Created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}
