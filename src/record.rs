use rusqlite::{types::ValueRef, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
struct StringError(String);

impl std::fmt::Display for StringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0)
    }
}

impl std::error::Error for StringError {}

/// One row of the user_data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub age: i64,
}

impl UserRecord {
    /// Maps a `(user_id, name, email, age)` row. The age column is normalized with [`get_age`].
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            age: get_age(row, 3)?,
        })
    }
}

/// Reads the DECIMAL(3,0) age column as an integer.
///
/// SQLite stores a DECIMAL affinity value as INTEGER, REAL, or TEXT depending on what was
/// bound at insert time; all three shapes must surface as the same `i64`. REAL values are
/// truncated toward zero.
pub fn get_age(row: &Row, idx: usize) -> rusqlite::Result<i64> {
    let value = row.get_ref(idx)?;
    match value {
        ValueRef::Integer(v) => Ok(v),
        ValueRef::Real(v) => Ok(v.trunc() as i64),
        ValueRef::Text(t) => {
            let text = String::from_utf8_lossy(t);
            text.trim()
                .parse::<i64>()
                .or_else(|_| text.trim().parse::<f64>().map(|v| v.trunc() as i64))
                .map_err(|_| {
                    rusqlite::Error::FromSqlConversionFailure(
                        idx,
                        value.data_type(),
                        Box::new(StringError(format!("Expected a numeric age but got {:?}.", text))),
                    )
                })
        }
        value => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            value.data_type(),
            Box::new(StringError(format!("Expected a numeric age but got {:?}.", value))),
        )),
    }
}

#[test]
fn test_get_age_shapes() {
    let con = rusqlite::Connection::open_in_memory().unwrap();
    con.execute_batch("CREATE TABLE t (age DECIMAL(3,0) NOT NULL)").unwrap();
    con.execute("INSERT INTO t VALUES (?)", (25i64,)).unwrap();
    con.execute("INSERT INTO t VALUES (?)", (25.9f64,)).unwrap();
    con.execute("INSERT INTO t VALUES (?)", ("25",)).unwrap();

    let ages = con
        .prepare("SELECT age FROM t")
        .unwrap()
        .query_map([], |row| get_age(row, 0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(ages, vec![25, 25, 25]);
}

#[test]
fn test_get_age_rejects_non_numeric() {
    let con = rusqlite::Connection::open_in_memory().unwrap();
    con.execute_batch("CREATE TABLE t (age)").unwrap();
    con.execute("INSERT INTO t VALUES (?)", ("twenty",)).unwrap();

    let err = con
        .prepare("SELECT age FROM t")
        .unwrap()
        .query_map([], |row| get_age(row, 0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap_err();
    assert!(err.to_string().contains("Expected a numeric age"));
}
