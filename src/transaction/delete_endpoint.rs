use std::{fmt::Display, str::FromStr};

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    Error,
    database_id::TransactionId,
    extract::{ApiPath, ApiQuery},
    transaction::TransactionState,
};

/// How a transaction should be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Mark the transaction as removed and keep the row.
    Soft,
    /// Remove the row for good.
    Hard,
}

impl FromStr for DeleteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soft" => Ok(DeleteMode::Soft),
            "hard" => Ok(DeleteMode::Hard),
            other => Err(Error::InvalidInput(format!(
                "invalid delete mode \"{other}\", expected \"soft\" or \"hard\""
            ))),
        }
    }
}

impl Display for DeleteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteMode::Soft => f.write_str("soft"),
            DeleteMode::Hard => f.write_str("hard"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    mode: Option<String>,
}

/// A route handler for deleting a transaction, responds with `204 No Content`.
///
/// The `mode` query parameter must be either `soft` or `hard`.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
    ApiQuery(params): ApiQuery<DeleteParams>,
) -> Result<StatusCode, Error> {
    let mode: DeleteMode = params
        .mode
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| Error::InvalidInput("missing delete mode".to_owned()))?
        .parse()?;

    match mode {
        DeleteMode::Soft => state.service.soft_delete_transaction(transaction_id)?,
        DeleteMode::Hard => state.service.delete_transaction(transaction_id)?,
    }

    tracing::info!("Deleted transaction {transaction_id} ({mode} delete)");

    Ok(StatusCode::NO_CONTENT)
}
