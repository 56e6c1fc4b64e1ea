//! Defines the core data models for transactions.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::database_id::TransactionId;

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the store.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned in this transaction.
    ///
    /// Always strictly positive, the direction of the money is given by
    /// [Transaction::transaction_type].
    pub amount: f64,
    /// What the money was spent on or earned from.
    pub category: Category,
    /// Whether money came in or went out.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the transaction was recorded, set by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Whether the transaction has been soft deleted.
    pub status: Status,
}

/// The validated fields needed to record a new [Transaction].
///
/// The store fills in the ID, date and status.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Trimmed, non-empty description.
    pub description: String,
    /// Strictly positive amount.
    pub amount: f64,
    pub category: Category,
    pub transaction_type: TransactionType,
}

/// A validated partial update to a [Transaction].
///
/// `Some` overwrites the stored value, `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub transaction_type: Option<TransactionType>,
}

impl TransactionUpdate {
    /// Whether the update would not change any field.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.transaction_type.is_none()
    }
}

/// The error returned when a string does not name a member of one of the
/// enumerated transaction fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("\"{value}\" is not a valid {field}")]
pub struct ParseEnumError {
    /// The name of the field, e.g. "category".
    pub field: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Generates the string conversions shared by the enumerated transaction fields.
macro_rules! string_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// The lowercase name used on the wire and in the database.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Whether `value` names a member of the set.
            pub fn is_valid(value: &str) -> bool {
                value.parse::<Self>().is_ok()
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        field: $field,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// What a transaction's money was spent on or earned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Leisure,
    Entertainment,
    Education,
}

string_enum!(Category, "category", {
    Food => "food",
    Transport => "transport",
    Leisure => "leisure",
    Entertainment => "entertainment",
    Education => "education",
});

/// The direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

string_enum!(TransactionType, "transaction type", {
    Income => "income",
    Expense => "expense",
});

/// Whether a transaction is live or has been soft deleted.
///
/// Removed transactions are still returned by every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Removed,
}

string_enum!(Status, "status", {
    Active => "active",
    Removed => "removed",
});
