//! Defines the transaction repository trait and its SQLite implementation.

use std::{
    ops::RangeInclusive,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{Connection, Row, types::Type};
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    database_id::TransactionId,
    transaction::core::{NewTransaction, Transaction, TransactionType, TransactionUpdate},
};

/// Errors originating from the transaction store.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RepositoryError {
    /// No row matched the requested ID.
    #[error("the transaction could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                RepositoryError::SqlError(error)
            }
        }
    }
}

/// Handles the persistence of transactions.
///
/// Implementers perform exactly the requested operation: they do not validate
/// their inputs, that is the job of the
/// [TransactionService](crate::transaction::TransactionService).
/// List operations return an empty vector when nothing matches.
pub trait TransactionRepository {
    /// Persist a new transaction, the store assigns the ID, date and status.
    fn add(&self, transaction: NewTransaction) -> Result<Transaction, RepositoryError>;

    /// Overwrite the fields set in `update`, leaving the others untouched.
    ///
    /// # Errors
    /// Returns [RepositoryError::NotFound] if `id` does not match a row.
    fn update(
        &self,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, RepositoryError>;

    /// Permanently remove a transaction.
    ///
    /// # Errors
    /// Returns [RepositoryError::NotFound] if `id` does not match a row.
    fn delete(&self, id: TransactionId) -> Result<(), RepositoryError>;

    /// Mark a transaction as [removed](crate::transaction::Status::Removed).
    ///
    /// # Errors
    /// Returns [RepositoryError::NotFound] if `id` does not match a row.
    fn soft_delete(&self, id: TransactionId) -> Result<(), RepositoryError>;

    /// Retrieve every transaction in the order they are stored.
    fn get_all(&self) -> Result<Vec<Transaction>, RepositoryError>;

    /// Retrieve a single transaction.
    ///
    /// # Errors
    /// Returns [RepositoryError::NotFound] if `id` does not match a row.
    fn get_by_id(&self, id: TransactionId) -> Result<Transaction, RepositoryError>;

    /// Retrieve the transactions of type `transaction_type`.
    fn get_by_type(
        &self,
        transaction_type: TransactionType,
    ) -> Result<Vec<Transaction>, RepositoryError>;

    /// Retrieve the transactions of type `transaction_type` recorded on a day
    /// within `date_range` (inclusive).
    fn get_by_type_and_date_range(
        &self,
        transaction_type: TransactionType,
        date_range: RangeInclusive<Date>,
    ) -> Result<Vec<Transaction>, RepositoryError>;

    /// Retrieve the transactions recorded on a day within `date_range` (inclusive).
    fn get_by_date_range(
        &self,
        date_range: RangeInclusive<Date>,
    ) -> Result<Vec<Transaction>, RepositoryError>;
}

const TRANSACTION_COLUMNS: &str = "id, description, amount, category, transaction_type, date, status";

/// Stores transactions in a SQLite database.
///
/// The table must have been created with [create_transaction_table], usually
/// through [crate::initialize_db].
#[derive(Debug, Clone)]
pub struct SQLiteTransactionRepository {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionRepository {
    /// Create a new repository for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            RepositoryError::DatabaseLockError
        })
    }

    fn query_many<P: rusqlite::Params>(
        &self,
        where_clause: &str,
        params: P,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let connection = self.lock()?;
        let query = format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" {where_clause} ORDER BY id");

        let transactions = connection
            .prepare(&query)?
            .query_map(params, map_transaction_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(transactions)
    }
}

type RowsAffected = usize;

fn expect_row_affected(rows_affected: RowsAffected) -> Result<(), RepositoryError> {
    match rows_affected {
        0 => Err(RepositoryError::NotFound),
        _ => Ok(()),
    }
}

impl TransactionRepository for SQLiteTransactionRepository {
    fn add(&self, transaction: NewTransaction) -> Result<Transaction, RepositoryError> {
        let connection = self.lock()?;

        let transaction = connection
            .prepare(&format!(
                "INSERT INTO \"transaction\" (description, amount, category, transaction_type)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    transaction.description,
                    transaction.amount,
                    transaction.category.as_str(),
                    transaction.transaction_type.as_str(),
                ),
                map_transaction_row,
            )?;

        Ok(transaction)
    }

    fn update(
        &self,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, RepositoryError> {
        if update.is_empty() {
            return self.get_by_id(id);
        }

        let connection = self.lock()?;

        // A single statement so that concurrent updates to different fields
        // do not overwrite each other.
        let transaction = connection
            .prepare(&format!(
                "UPDATE \"transaction\"
                 SET description = COALESCE(?1, description),
                     amount = COALESCE(?2, amount),
                     category = COALESCE(?3, category),
                     transaction_type = COALESCE(?4, transaction_type)
                 WHERE id = ?5
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    update.description,
                    update.amount,
                    update.category.map(|category| category.as_str()),
                    update
                        .transaction_type
                        .map(|transaction_type| transaction_type.as_str()),
                    id,
                ),
                map_transaction_row,
            )?;

        Ok(transaction)
    }

    fn delete(&self, id: TransactionId) -> Result<(), RepositoryError> {
        let rows_affected = self
            .lock()?
            .execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])?;

        expect_row_affected(rows_affected)
    }

    fn soft_delete(&self, id: TransactionId) -> Result<(), RepositoryError> {
        let rows_affected = self.lock()?.execute(
            "UPDATE \"transaction\" SET status = 'removed' WHERE id = ?1",
            (id,),
        )?;

        expect_row_affected(rows_affected)
    }

    fn get_all(&self) -> Result<Vec<Transaction>, RepositoryError> {
        self.query_many("", ())
    }

    fn get_by_id(&self, id: TransactionId) -> Result<Transaction, RepositoryError> {
        let transaction = self
            .lock()?
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], map_transaction_row)?;

        Ok(transaction)
    }

    fn get_by_type(
        &self,
        transaction_type: TransactionType,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        self.query_many(
            "WHERE transaction_type = ?1",
            (transaction_type.as_str(),),
        )
    }

    fn get_by_type_and_date_range(
        &self,
        transaction_type: TransactionType,
        date_range: RangeInclusive<Date>,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        self.query_many(
            "WHERE transaction_type = ?1 AND date(date) BETWEEN ?2 AND ?3",
            (
                transaction_type.as_str(),
                date_range.start(),
                date_range.end(),
            ),
        )
    }

    fn get_by_date_range(
        &self,
        date_range: RangeInclusive<Date>,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        self.query_many(
            "WHERE date(date) BETWEEN ?1 AND ?2",
            (date_range.start(), date_range.end()),
        )
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                category TEXT NOT NULL
                    CHECK (category IN ('food', 'transport', 'leisure', 'entertainment', 'education')),
                transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
                date TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'removed'))
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Used by the type and date range queries behind the summaries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_type_date ON \"transaction\"(transaction_type, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let description = row.get(1)?;
    let amount = row.get(2)?;
    let category = parse_column(row, 3)?;
    let transaction_type = parse_column(row, 4)?;
    let date: String = row.get(5)?;
    let date = OffsetDateTime::parse(&date, &Rfc3339).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(error))
    })?;
    let status = parse_column(row, 6)?;

    Ok(Transaction {
        id,
        description,
        amount,
        category,
        transaction_type,
        date,
        status,
    })
}

fn parse_column<T>(row: &Row, index: usize) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(index)?;

    text.parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

// ============================================================================
// TESTS
// ============================================================================
