use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};

use ledger_rs::{
    initialize_db,
    transaction::{CreateTransactionRequest, SQLiteTransactionRepository, TransactionService},
};

/// A utility for creating a test database for the REST API server of ledger_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// (description, amount, category, type, days ago)
const SAMPLE_TRANSACTIONS: [(&str, f64, &str, &str, i64); 8] = [
    ("Salary", 3200.0, "education", "income", 30),
    ("Bus pass", 45.0, "transport", "expense", 28),
    ("Groceries", 86.4, "food", "expense", 21),
    ("Online course", 120.0, "education", "expense", 14),
    ("Tutoring", 250.0, "education", "income", 10),
    ("Cinema", 18.5, "entertainment", "expense", 7),
    ("Hiking trip", 60.0, "leisure", "expense", 3),
    ("Lunch", 12.5, "food", "expense", 0),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let conn = Arc::new(Mutex::new(conn));
    let service = TransactionService::new(SQLiteTransactionRepository::new(conn.clone()));
    let now = OffsetDateTime::now_utc();

    println!("Creating {} test transactions...", SAMPLE_TRANSACTIONS.len());

    for (description, amount, category, transaction_type, days_ago) in SAMPLE_TRANSACTIONS {
        let transaction = service.add_transaction(CreateTransactionRequest {
            description: description.to_owned(),
            amount,
            category: category.to_owned(),
            transaction_type: transaction_type.to_owned(),
        })?;

        let date = (now - Duration::days(days_ago)).format(&Rfc3339)?;
        conn.lock()
            .map_err(|_| "database lock was poisoned")?
            .execute(
                "UPDATE \"transaction\" SET date = ?1 WHERE id = ?2",
                (date, transaction.id),
            )?;
    }

    println!("Success!");

    Ok(())
}
