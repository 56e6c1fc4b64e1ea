//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

/// The route for checking that the server is up.
pub const HEALTH: &str = "/api/health";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to get, update and delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the total of one type of transaction over a date range.
pub const SUMMARY_BY_TYPE: &str = "/api/summary/type";
/// The route for the net income over all transactions.
pub const SUMMARY_NET: &str = "/api/summary/net";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// Assumes that the endpoint has exactly one parameter, e.g. "{transaction_id}".
/// If there is no parameter, `endpoint_path` is returned unchanged.
///
/// # Examples
///
/// ```
/// use ledger_rs::endpoints::{TRANSACTION, format_endpoint};
///
/// assert_eq!(format_endpoint(TRANSACTION, 42), "/api/transactions/42");
/// ```
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    match (endpoint_path.find('{'), endpoint_path.find('}')) {
        (Some(start), Some(end)) if start < end => format!(
            "{}{id}{}",
            &endpoint_path[..start],
            &endpoint_path[end + 1..]
        ),
        _ => endpoint_path.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{HEALTH, TRANSACTION, format_endpoint};

    #[test]
    fn formats_parameter() {
        assert_eq!(format_endpoint(TRANSACTION, 7), "/api/transactions/7");
    }

    #[test]
    fn leaves_endpoint_without_parameter_unchanged() {
        assert_eq!(format_endpoint(HEALTH, 7), HEALTH);
    }
}
