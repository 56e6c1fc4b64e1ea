use axum::{Json, extract::State};
use serde::Deserialize;

use crate::{
    Error,
    database_id::TransactionId,
    extract::{ApiPath, ApiQuery},
    transaction::{Transaction, TransactionState},
};

/// The optional filters for listing transactions.
///
/// Values are trimmed and empty values are treated as missing.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    #[serde(rename = "type")]
    transaction_type: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// A route handler for listing transactions.
///
/// - `type`, `from` and `to`: transactions of that type within the date range,
/// - `from` and `to`: transactions within the date range,
/// - `type`: transactions of that type,
/// - nothing: every transaction.
///
/// Supplying only one end of the date range is rejected.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    ApiQuery(filter): ApiQuery<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let service = &state.service;
    let transaction_type = non_empty(&filter.transaction_type);

    let transactions = match (
        transaction_type,
        non_empty(&filter.from),
        non_empty(&filter.to),
    ) {
        (Some(transaction_type), Some(from), Some(to)) => {
            service.get_transactions_by_type_and_date_range(transaction_type, from, to)?
        }
        (None, Some(from), Some(to)) => service.get_transactions_by_date_range(from, to)?,
        (_, Some(_), None) | (_, None, Some(_)) => {
            return Err(Error::InvalidInput(
                "both \"from\" and \"to\" are needed to filter by date".to_owned(),
            ));
        }
        (Some(transaction_type), None, None) => {
            service.get_transactions_by_type(transaction_type)?
        }
        (None, None, None) => service.get_all_transactions()?,
    };

    Ok(Json(transactions))
}

/// A route handler for getting a transaction by its database ID.
///
/// Responds with 404 if the transaction does not exist.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    state.service.get_transaction(transaction_id).map(Json)
}
