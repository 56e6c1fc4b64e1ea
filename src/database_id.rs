//! Database ID type definition.

/// Alias for the integer type used for mapping to transaction IDs.
///
/// Valid IDs are strictly positive; SQLite assigns them starting from 1.
pub type TransactionId = i64;
