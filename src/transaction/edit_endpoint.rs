use axum::{Json, extract::State};

use crate::{
    Error,
    database_id::TransactionId,
    extract::{ApiJson, ApiPath},
    transaction::{Transaction, TransactionState, UpdateTransactionRequest},
};

/// A route handler for partially updating a transaction.
///
/// Only the fields present in the body are changed. Responds with the updated
/// transaction.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
    ApiJson(request): ApiJson<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, Error> {
    state
        .service
        .update_transaction(transaction_id, request)
        .map(Json)
}
