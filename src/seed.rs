use crate::{datasource::UserDataSource, error::Error};
use serde::Deserialize;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS user_data (
    user_id CHAR(36) PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    age DECIMAL(3,0) NOT NULL
)";
// SQLite has no inline INDEX clause, so the index is a separate statement.
const CREATE_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_user_id ON user_data (user_id)";
const INSERT_USER: &str = "INSERT INTO user_data (user_id, name, email, age) VALUES (?, ?, ?, ?)";

#[cfg_attr(test, derive(Debug, PartialEq))]
pub enum SeedOutcome {
    /// The table already held rows; nothing was imported.
    AlreadyPopulated { rows: i64 },
    Imported { inserted: usize, skipped: usize },
}

/// The CSV header row supplies the field names.
#[derive(Deserialize)]
struct CsvRow {
    user_id: String,
    name: String,
    email: String,
    age: i64,
}

pub fn ensure_schema(source: &mut UserDataSource) -> std::result::Result<(), Error> {
    source
        .con
        .execute(CREATE_TABLE, [])
        .or_else(|err| Error::new_query_error(err, CREATE_TABLE))?;
    source
        .con
        .execute(CREATE_INDEX, [])
        .or_else(|err| Error::new_query_error(err, CREATE_INDEX))?;
    Ok(())
}

/// Imports `csv_file` into user_data.
///
/// A populated table makes the whole import a no-op, so re-running the seed never
/// duplicates rows. Rows whose user_id is not a well-formed UUID are skipped and
/// counted. The insert runs inside one transaction; any other failure rolls the
/// whole import back.
pub fn import_csv(source: &mut UserDataSource, csv_file: &str) -> std::result::Result<SeedOutcome, Error> {
    let rows = source.count()?;
    if rows > 0 {
        return Ok(SeedOutcome::AlreadyPopulated { rows });
    }

    let file = std::fs::File::open(csv_file)
        .or_else(|err| Error::new_other_error(format!("Failed to open the CSV file {csv_file:?}: {err}")))?;
    let mut reader = csv::ReaderBuilder::new().from_reader(file);

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    let tx = source
        .con
        .transaction()
        .or_else(|err| Error::new_query_error(err, "BEGIN;"))?;
    {
        let mut insert = tx
            .prepare(INSERT_USER)
            .or_else(|err| Error::new_query_error(err, INSERT_USER))?;
        for record in reader.deserialize::<CsvRow>() {
            let row = record?;
            if uuid::Uuid::parse_str(&row.user_id).is_err() {
                skipped += 1;
                continue;
            }
            insert
                .execute(rusqlite::params![row.user_id, row.name, row.email, row.age])
                .or_else(|err| Error::new_query_error(err, INSERT_USER))?;
            inserted += 1;
        }
    }
    tx.commit().or_else(|err| Error::new_query_error(err, "COMMIT;"))?;

    Ok(SeedOutcome::Imported { inserted, skipped })
}
