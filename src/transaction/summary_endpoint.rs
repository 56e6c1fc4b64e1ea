use axum::{Json, extract::State};
use serde::Deserialize;

use crate::{Error, extract::ApiQuery, transaction::TransactionState};

#[derive(Debug, Default, Deserialize)]
pub struct TotalParams {
    #[serde(default, rename = "type")]
    transaction_type: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
}

/// A route handler for the total amount of one type of transaction between
/// two dates (inclusive).
///
/// All three query parameters are required: `type`, `from` and `to`.
pub async fn get_total_by_type_endpoint(
    State(state): State<TransactionState>,
    ApiQuery(params): ApiQuery<TotalParams>,
) -> Result<Json<f64>, Error> {
    state
        .service
        .total_by_type_and_date_range(
            params.transaction_type.trim(),
            params.from.trim(),
            params.to.trim(),
        )
        .map(Json)
}

/// A route handler for the net income, total income minus total expenses,
/// across every recorded transaction.
pub async fn get_net_income_endpoint(
    State(state): State<TransactionState>,
) -> Result<Json<f64>, Error> {
    state.service.net_income().map(Json)
}
