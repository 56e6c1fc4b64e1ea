//! Validation and aggregation on top of a [TransactionRepository].

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{
        core::{Category, NewTransaction, Transaction, TransactionType, TransactionUpdate},
        repository::{RepositoryError, TransactionRepository},
    },
};

/// The raw fields a client sends to record a new transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub description: String,
    pub amount: f64,
    pub category: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
}

/// The raw fields a client sends to change a transaction.
///
/// Fields that are missing (or `null`) are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
}

/// Enforces the rules for transactions before handing them to the repository.
///
/// Every method validates its arguments first, so invalid input never
/// reaches the store. The service keeps no state between calls.
#[derive(Debug, Clone)]
pub struct TransactionService<R> {
    repository: R,
}

impl<R> TransactionService<R>
where
    R: TransactionRepository,
{
    /// Create a service that persists transactions in `repository`.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Record a new transaction.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if the description is blank, the amount is
    /// not strictly positive, or the category or type is not recognised.
    pub fn add_transaction(
        &self,
        request: CreateTransactionRequest,
    ) -> Result<Transaction, Error> {
        let new_transaction = NewTransaction {
            description: validate_description(&request.description)?,
            amount: validate_amount(request.amount)?,
            category: parse_category(&request.category)?,
            transaction_type: parse_transaction_type(&request.transaction_type)?,
        };

        tracing::debug!("Adding transaction {new_transaction:?}");

        Ok(self.repository.add(new_transaction)?)
    }

    /// Change the fields of transaction `id` that are present in `request`.
    ///
    /// # Errors
    /// Returns [Error::InvalidId] if `id` is not positive, [Error::InvalidInput]
    /// if any supplied field breaks the rules of [Self::add_transaction], or
    /// [Error::TransactionNotFound] if there is no such transaction.
    pub fn update_transaction(
        &self,
        id: TransactionId,
        request: UpdateTransactionRequest,
    ) -> Result<Transaction, Error> {
        validate_id(id)?;

        let update = TransactionUpdate {
            description: request
                .description
                .as_deref()
                .map(validate_description)
                .transpose()?,
            amount: request.amount.map(validate_amount).transpose()?,
            category: request
                .category
                .as_deref()
                .map(parse_category)
                .transpose()?,
            transaction_type: request
                .transaction_type
                .as_deref()
                .map(parse_transaction_type)
                .transpose()?,
        };

        tracing::debug!("Updating transaction {id} with {update:?}");

        self.repository
            .update(id, update)
            .map_err(|error| not_found_as(id, error))
    }

    /// Permanently remove transaction `id`.
    ///
    /// # Errors
    /// Returns [Error::InvalidId] if `id` is not positive or
    /// [Error::TransactionNotFound] if there is no such transaction.
    pub fn delete_transaction(&self, id: TransactionId) -> Result<(), Error> {
        validate_id(id)?;

        tracing::debug!("Deleting transaction {id}");

        self.repository
            .delete(id)
            .map_err(|error| not_found_as(id, error))
    }

    /// Mark transaction `id` as removed while keeping it in the store.
    ///
    /// # Errors
    /// Returns [Error::InvalidId] if `id` is not positive or
    /// [Error::TransactionNotFound] if there is no such transaction.
    pub fn soft_delete_transaction(&self, id: TransactionId) -> Result<(), Error> {
        validate_id(id)?;

        tracing::debug!("Soft deleting transaction {id}");

        self.repository
            .soft_delete(id)
            .map_err(|error| not_found_as(id, error))
    }

    /// Retrieve every transaction, including removed ones.
    pub fn get_all_transactions(&self) -> Result<Vec<Transaction>, Error> {
        Ok(self.repository.get_all()?)
    }

    /// Retrieve transaction `id`.
    ///
    /// # Errors
    /// Returns [Error::InvalidId] if `id` is not positive or
    /// [Error::TransactionNotFound] if there is no such transaction.
    pub fn get_transaction(&self, id: TransactionId) -> Result<Transaction, Error> {
        validate_id(id)?;

        self.repository
            .get_by_id(id)
            .map_err(|error| not_found_as(id, error))
    }

    /// Retrieve the transactions of type `transaction_type`, e.g. "income".
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if `transaction_type` is not recognised.
    pub fn get_transactions_by_type(
        &self,
        transaction_type: &str,
    ) -> Result<Vec<Transaction>, Error> {
        let transaction_type = parse_transaction_type(transaction_type)?;

        Ok(self.repository.get_by_type(transaction_type)?)
    }

    /// Retrieve the transactions of type `transaction_type` recorded between
    /// the dates `from` and `to` (inclusive, formatted as `YYYY-MM-DD`).
    ///
    /// An inverted range is not an error, it simply matches nothing.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if the type is not recognised or either
    /// date is malformed.
    pub fn get_transactions_by_type_and_date_range(
        &self,
        transaction_type: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<Transaction>, Error> {
        let transaction_type = parse_transaction_type(transaction_type)?;
        let date_range = parse_date_range(from, to)?;

        Ok(self
            .repository
            .get_by_type_and_date_range(transaction_type, date_range)?)
    }

    /// Retrieve the transactions recorded between the dates `from` and `to`
    /// (inclusive, formatted as `YYYY-MM-DD`).
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if either date is malformed.
    pub fn get_transactions_by_date_range(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<Transaction>, Error> {
        let date_range = parse_date_range(from, to)?;

        Ok(self.repository.get_by_date_range(date_range)?)
    }

    /// Sum the amounts of the transactions of type `transaction_type` recorded
    /// between `from` and `to` (inclusive). Returns 0.0 if none match.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if the type is not recognised or either
    /// date is malformed.
    pub fn total_by_type_and_date_range(
        &self,
        transaction_type: &str,
        from: &str,
        to: &str,
    ) -> Result<f64, Error> {
        let transactions =
            self.get_transactions_by_type_and_date_range(transaction_type, from, to)?;

        Ok(sum_amounts(&transactions))
    }

    /// Total income minus total expenses over the whole history.
    pub fn net_income(&self) -> Result<f64, Error> {
        let expenses = self.repository.get_by_type(TransactionType::Expense)?;
        let income = self.repository.get_by_type(TransactionType::Income)?;

        Ok(sum_amounts(&income) - sum_amounts(&expenses))
    }
}

fn sum_amounts(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(|transaction| transaction.amount)
        .sum()
}

fn not_found_as(id: TransactionId, error: RepositoryError) -> Error {
    match error {
        RepositoryError::NotFound => Error::TransactionNotFound(id),
        error => Error::Storage(error),
    }
}

fn validate_id(id: TransactionId) -> Result<(), Error> {
    if id <= 0 {
        return Err(Error::InvalidId(id));
    }

    Ok(())
}

fn validate_description(description: &str) -> Result<String, Error> {
    let description = description.trim();

    if description.is_empty() {
        return Err(Error::InvalidInput(
            "description cannot be empty".to_owned(),
        ));
    }

    Ok(description.to_owned())
}

fn validate_amount(amount: f64) -> Result<f64, Error> {
    // NaN fails every comparison, so it is rejected here as well.
    if !(amount > 0.0 && amount.is_finite()) {
        return Err(Error::InvalidInput(format!(
            "amount must be a positive number, got {amount}"
        )));
    }

    Ok(amount)
}

fn parse_category(category: &str) -> Result<Category, Error> {
    category
        .parse::<Category>()
        .map_err(|error| Error::InvalidInput(error.to_string()))
}

fn parse_transaction_type(transaction_type: &str) -> Result<TransactionType, Error> {
    transaction_type
        .parse::<TransactionType>()
        .map_err(|error| Error::InvalidInput(error.to_string()))
}

/// Parse a `YYYY-MM-DD` calendar date.
fn parse_date(date: &str) -> Result<Date, Error> {
    Date::parse(date, format_description!("[year]-[month]-[day]")).map_err(|_| {
        Error::InvalidInput(format!(
            "\"{date}\" is not a valid date, expected the format YYYY-MM-DD"
        ))
    })
}

fn parse_date_range(from: &str, to: &str) -> Result<RangeInclusive<Date>, Error> {
    Ok(parse_date(from)?..=parse_date(to)?)
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        ops::RangeInclusive,
    };

    use time::{Date, Duration, OffsetDateTime, macros::{date, datetime}};

    use crate::{
        Error,
        database_id::TransactionId,
        transaction::{
            Category, NewTransaction, Status, Transaction, TransactionType, TransactionUpdate,
            repository::{RepositoryError, TransactionRepository},
        },
    };

    use super::{CreateTransactionRequest, TransactionService, UpdateTransactionRequest, parse_date};

    /// Keeps transactions in memory and counts how often it is called.
    #[derive(Default)]
    struct FakeRepository {
        transactions: RefCell<Vec<Transaction>>,
        calls: Cell<usize>,
    }

    impl FakeRepository {
        fn record_call(&self) {
            self.calls.set(self.calls.get() + 1);
        }

        fn find(&self, id: TransactionId) -> Option<usize> {
            self.transactions
                .borrow()
                .iter()
                .position(|transaction| transaction.id == id)
        }

        fn filter(&self, predicate: impl Fn(&Transaction) -> bool) -> Vec<Transaction> {
            self.transactions
                .borrow()
                .iter()
                .filter(|transaction| predicate(transaction))
                .cloned()
                .collect()
        }

        fn set_date(&self, id: TransactionId, date: OffsetDateTime) {
            let index = self.find(id).expect("no such test transaction");
            self.transactions.borrow_mut()[index].date = date;
        }
    }

    impl TransactionRepository for &FakeRepository {
        fn add(&self, transaction: NewTransaction) -> Result<Transaction, RepositoryError> {
            self.record_call();
            let mut transactions = self.transactions.borrow_mut();
            let transaction = Transaction {
                id: transactions.len() as TransactionId + 1,
                description: transaction.description,
                amount: transaction.amount,
                category: transaction.category,
                transaction_type: transaction.transaction_type,
                date: OffsetDateTime::now_utc(),
                status: Status::Active,
            };
            transactions.push(transaction.clone());

            Ok(transaction)
        }

        fn update(
            &self,
            id: TransactionId,
            update: TransactionUpdate,
        ) -> Result<Transaction, RepositoryError> {
            self.record_call();
            let index = self.find(id).ok_or(RepositoryError::NotFound)?;
            let mut transactions = self.transactions.borrow_mut();
            let transaction = &mut transactions[index];

            if let Some(description) = update.description {
                transaction.description = description;
            }
            if let Some(amount) = update.amount {
                transaction.amount = amount;
            }
            if let Some(category) = update.category {
                transaction.category = category;
            }
            if let Some(transaction_type) = update.transaction_type {
                transaction.transaction_type = transaction_type;
            }

            Ok(transaction.clone())
        }

        fn delete(&self, id: TransactionId) -> Result<(), RepositoryError> {
            self.record_call();
            let index = self.find(id).ok_or(RepositoryError::NotFound)?;
            self.transactions.borrow_mut().remove(index);

            Ok(())
        }

        fn soft_delete(&self, id: TransactionId) -> Result<(), RepositoryError> {
            self.record_call();
            let index = self.find(id).ok_or(RepositoryError::NotFound)?;
            self.transactions.borrow_mut()[index].status = Status::Removed;

            Ok(())
        }

        fn get_all(&self) -> Result<Vec<Transaction>, RepositoryError> {
            self.record_call();
            Ok(self.transactions.borrow().clone())
        }

        fn get_by_id(&self, id: TransactionId) -> Result<Transaction, RepositoryError> {
            self.record_call();
            let index = self.find(id).ok_or(RepositoryError::NotFound)?;

            Ok(self.transactions.borrow()[index].clone())
        }

        fn get_by_type(
            &self,
            transaction_type: TransactionType,
        ) -> Result<Vec<Transaction>, RepositoryError> {
            self.record_call();
            Ok(self.filter(|transaction| transaction.transaction_type == transaction_type))
        }

        fn get_by_type_and_date_range(
            &self,
            transaction_type: TransactionType,
            date_range: RangeInclusive<Date>,
        ) -> Result<Vec<Transaction>, RepositoryError> {
            self.record_call();
            Ok(self.filter(|transaction| {
                transaction.transaction_type == transaction_type
                    && date_range.contains(&transaction.date.date())
            }))
        }

        fn get_by_date_range(
            &self,
            date_range: RangeInclusive<Date>,
        ) -> Result<Vec<Transaction>, RepositoryError> {
            self.record_call();
            Ok(self.filter(|transaction| date_range.contains(&transaction.date.date())))
        }
    }

    fn request(
        description: &str,
        amount: f64,
        category: &str,
        transaction_type: &str,
    ) -> CreateTransactionRequest {
        CreateTransactionRequest {
            description: description.to_owned(),
            amount,
            category: category.to_owned(),
            transaction_type: transaction_type.to_owned(),
        }
    }

    fn must_add(
        service: &TransactionService<&FakeRepository>,
        amount: f64,
        transaction_type: &str,
    ) -> Transaction {
        service
            .add_transaction(request("test", amount, "food", transaction_type))
            .expect("could not add test transaction")
    }

    #[test]
    fn add_returns_active_transaction() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);
        let before = OffsetDateTime::now_utc() - Duration::seconds(1);

        let transaction = service
            .add_transaction(request("  Lunch ", 12.5, "food", "expense"))
            .expect("could not add transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.description, "Lunch");
        assert_eq!(transaction.amount, 12.5);
        assert_eq!(transaction.category, Category::Food);
        assert_eq!(transaction.transaction_type, TransactionType::Expense);
        assert_eq!(transaction.status, Status::Active);
        assert!(transaction.date >= before);
    }

    #[test]
    fn add_rejects_invalid_input_without_touching_store() {
        let cases = [
            request("", 1.0, "food", "expense"),
            request("   \t", 1.0, "food", "expense"),
            request("Lunch", 0.0, "food", "expense"),
            request("Lunch", -3.0, "food", "expense"),
            request("Lunch", f64::NAN, "food", "expense"),
            request("Lunch", f64::INFINITY, "food", "expense"),
            request("Lunch", 1.0, "groceries", "expense"),
            request("Lunch", 1.0, "food", "transfer"),
        ];

        for case in cases {
            let repository = FakeRepository::default();
            let service = TransactionService::new(&repository);

            let result = service.add_transaction(case.clone());

            assert!(
                matches!(result, Err(Error::InvalidInput(_))),
                "want invalid input for {case:?}, got {result:?}"
            );
            assert_eq!(repository.calls.get(), 0, "store was called for {case:?}");
            assert!(repository.transactions.borrow().is_empty());
        }
    }

    #[test]
    fn id_operations_reject_non_positive_ids_without_touching_store() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);

        for id in [0, -1, i64::MIN] {
            assert_eq!(service.get_transaction(id), Err(Error::InvalidId(id)));
            assert_eq!(service.delete_transaction(id), Err(Error::InvalidId(id)));
            assert_eq!(service.soft_delete_transaction(id), Err(Error::InvalidId(id)));
            assert_eq!(
                service.update_transaction(id, UpdateTransactionRequest::default()),
                Err(Error::InvalidId(id))
            );
        }

        assert_eq!(repository.calls.get(), 0);
    }

    #[test]
    fn id_operations_report_missing_transactions() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);
        let id = 99;

        assert_eq!(service.get_transaction(id), Err(Error::TransactionNotFound(id)));
        assert_eq!(service.delete_transaction(id), Err(Error::TransactionNotFound(id)));
        assert_eq!(
            service.soft_delete_transaction(id),
            Err(Error::TransactionNotFound(id))
        );
        assert_eq!(
            service.update_transaction(id, UpdateTransactionRequest::default()),
            Err(Error::TransactionNotFound(id))
        );
    }

    #[test]
    fn update_changes_only_supplied_fields() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);
        let original = service
            .add_transaction(request("Bus", 3.0, "transport", "expense"))
            .unwrap();

        let updated = service
            .update_transaction(
                original.id,
                UpdateTransactionRequest {
                    description: Some(" Train ".to_owned()),
                    amount: Some(7.5),
                    ..Default::default()
                },
            )
            .expect("could not update transaction");

        assert_eq!(
            updated,
            Transaction {
                description: "Train".to_owned(),
                amount: 7.5,
                ..original
            }
        );
    }

    #[test]
    fn empty_update_leaves_content_unchanged() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);
        let original = must_add(&service, 10.0, "income");

        let updated = service
            .update_transaction(original.id, UpdateTransactionRequest::default())
            .unwrap();

        assert_eq!(updated, original);
    }

    #[test]
    fn update_rejects_invalid_fields_without_touching_store() {
        let cases = [
            UpdateTransactionRequest {
                description: Some("  ".to_owned()),
                ..Default::default()
            },
            UpdateTransactionRequest {
                amount: Some(0.0),
                ..Default::default()
            },
            UpdateTransactionRequest {
                amount: Some(-1.0),
                ..Default::default()
            },
            UpdateTransactionRequest {
                category: Some("rent".to_owned()),
                ..Default::default()
            },
            UpdateTransactionRequest {
                transaction_type: Some("refund".to_owned()),
                ..Default::default()
            },
        ];

        for case in cases {
            let repository = FakeRepository::default();
            let service = TransactionService::new(&repository);

            let result = service.update_transaction(1, case.clone());

            assert!(
                matches!(result, Err(Error::InvalidInput(_))),
                "want invalid input for {case:?}, got {result:?}"
            );
            assert_eq!(repository.calls.get(), 0, "store was called for {case:?}");
        }
    }

    #[test]
    fn soft_deleted_transaction_is_still_retrievable() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);
        let transaction = must_add(&service, 10.0, "expense");

        service.soft_delete_transaction(transaction.id).unwrap();

        let got = service.get_transaction(transaction.id).unwrap();
        assert_eq!(got.status, Status::Removed);
        assert_eq!(service.get_all_transactions().unwrap().len(), 1);
    }

    #[test]
    fn hard_deleted_transaction_is_gone() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);
        let transaction = must_add(&service, 10.0, "expense");

        service.delete_transaction(transaction.id).unwrap();

        assert_eq!(
            service.get_transaction(transaction.id),
            Err(Error::TransactionNotFound(transaction.id))
        );
    }

    #[test]
    fn get_by_type_rejects_unknown_type() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);

        let result = service.get_transactions_by_type("salary");

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(repository.calls.get(), 0);
    }

    #[test]
    fn malformed_dates_are_invalid_input_for_every_range_operation() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);

        for (from, to) in [
            ("2024-13-40", "2024-12-31"),
            ("2024-01-01", "not-a-date"),
            ("", "2024-12-31"),
            ("2024/01/01", "2024-12-31"),
            ("2024-02-30", "2024-03-01"),
        ] {
            let results = [
                service.get_transactions_by_date_range(from, to).map(|_| ()),
                service
                    .get_transactions_by_type_and_date_range("income", from, to)
                    .map(|_| ()),
                service
                    .total_by_type_and_date_range("income", from, to)
                    .map(|_| ()),
            ];

            for result in results {
                assert!(
                    matches!(result, Err(Error::InvalidInput(_))),
                    "want invalid input for ({from:?}, {to:?}), got {result:?}"
                );
            }
        }

        assert_eq!(repository.calls.get(), 0);
    }

    #[test]
    fn parse_date_accepts_calendar_dates() {
        assert_eq!(parse_date("2024-02-29"), Ok(date!(2024 - 02 - 29)));
        assert!(parse_date("2023-02-29").is_err());
    }

    #[test]
    fn inverted_range_returns_empty_vec() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);
        let transaction = must_add(&service, 10.0, "income");
        repository.set_date(transaction.id, datetime!(2025-06-15 08:00 UTC));

        let got = service
            .get_transactions_by_type_and_date_range("income", "2025-06-30", "2025-06-01")
            .unwrap();

        assert_eq!(got, vec![]);
        assert_eq!(
            service
                .get_transactions_by_date_range("2025-06-30", "2025-06-01")
                .unwrap(),
            vec![]
        );
    }

    #[test]
    fn total_sums_matching_transactions() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);
        let in_range = must_add(&service, 10.25, "expense");
        let also_in_range = must_add(&service, 5.5, "expense");
        let wrong_type = must_add(&service, 100.0, "income");
        let out_of_range = must_add(&service, 40.0, "expense");
        repository.set_date(in_range.id, datetime!(2025-06-01 00:00 UTC));
        repository.set_date(also_in_range.id, datetime!(2025-06-30 23:59 UTC));
        repository.set_date(wrong_type.id, datetime!(2025-06-10 12:00 UTC));
        repository.set_date(out_of_range.id, datetime!(2025-07-01 00:00 UTC));

        let total = service
            .total_by_type_and_date_range("expense", "2025-06-01", "2025-06-30")
            .unwrap();

        assert_eq!(total, 15.75);
    }

    #[test]
    fn total_of_nothing_is_zero() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);

        let total = service
            .total_by_type_and_date_range("income", "2025-01-01", "2025-12-31")
            .unwrap();

        assert_eq!(total, 0.0);
    }

    #[test]
    fn total_rejects_unknown_type() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);

        let result = service.total_by_type_and_date_range("both", "2025-01-01", "2025-12-31");

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn net_income_is_income_minus_expenses() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);
        must_add(&service, 100.0, "income");
        must_add(&service, 40.0, "expense");

        assert_eq!(service.net_income(), Ok(60.0));
    }

    #[test]
    fn net_income_of_nothing_is_zero() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);

        assert_eq!(service.net_income(), Ok(0.0));
    }

    #[test]
    fn lunch_scenario() {
        let repository = FakeRepository::default();
        let service = TransactionService::new(&repository);

        let lunch = service
            .add_transaction(request("Lunch", 12.50, "food", "expense"))
            .expect("could not add lunch");

        assert_eq!(lunch.status, Status::Active);
        assert!(
            service
                .get_transactions_by_type("expense")
                .unwrap()
                .contains(&lunch)
        );
        assert_eq!(service.net_income(), Ok(-12.50));
    }
}
