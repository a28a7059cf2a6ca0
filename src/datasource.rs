use crate::{
    error::Error,
    paginate::PagedSource,
    record::{get_age, UserRecord},
};

pub const SELECT_USERS: &str = "SELECT user_id, name, email, age FROM user_data";
pub const SELECT_AGES: &str = "SELECT age FROM user_data";
pub const SELECT_PAGE: &str = "SELECT user_id, name, email, age FROM user_data LIMIT ? OFFSET ?";
pub const COUNT_USERS: &str = "SELECT count(*) FROM user_data";

const HEALTH_CHECK: &str = "SELECT count(*) FROM sqlite_master";

/// Owns the single connection to a user_data database.
///
/// Every read goes through either a fresh `LIMIT ? OFFSET ?` statement ([`Self::fetch_page`])
/// or a cursor that keeps one prepared statement open for a whole traversal
/// ([`Self::users`], [`Self::ages`]).
#[derive(Debug)]
pub struct UserDataSource {
    pub(crate) con: rusqlite::Connection,
}

impl UserDataSource {
    /// Opens the database, sets busy_timeout to 500, and verifies the file is readable
    /// as a database before accepting it.
    pub fn open(database_filepath: &str) -> std::result::Result<Self, Error> {
        // Connect to the database
        let con = rusqlite::Connection::open(database_filepath).or_else(|err| {
            Error::new_connection_error(format!("Failed to open the database {database_filepath:?}: {err}"), vec![])
        })?;

        // Set busy_timeout to 500
        con.pragma_update(None, "busy_timeout", 500)
            .or_else(|err| Error::new_query_error(err, "PRAGMA busy_timeout = 500"))?;

        // A corrupt or non-database file only fails once a query touches it
        con.query_row(HEALTH_CHECK, [], |row| row.get::<_, i64>(0))
            .or_else(|err| Error::new_query_error(err, HEALTH_CHECK))?;

        Ok(Self { con })
    }

    /// Tries each candidate path in order and uses the first that opens and passes the
    /// health check. Reports every failed attempt when no candidate works.
    pub fn connect_any(candidates: &[String]) -> std::result::Result<Self, Error> {
        let mut attempts = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match Self::open(candidate) {
                Ok(source) => return Ok(source),
                Err(err) => attempts.push(format!("{candidate}: {err}")),
            }
        }
        Error::new_connection_error("Could not open any of the candidate databases", attempts)
    }

    pub fn count(&self) -> std::result::Result<i64, Error> {
        self.con
            .query_row(COUNT_USERS, [], |row| row.get(0))
            .or_else(|err| Error::new_query_error(err, COUNT_USERS))
    }

    /// One discrete `LIMIT ? OFFSET ?` query. A fresh statement is prepared per call;
    /// no state is carried across calls.
    pub fn fetch_page(&self, offset: i64, limit: i64) -> std::result::Result<Vec<UserRecord>, Error> {
        let mut stmt = self
            .con
            .prepare(SELECT_PAGE)
            .or_else(|err| Error::new_query_error(err, SELECT_PAGE))?;
        stmt.query_map(rusqlite::params![limit, offset], UserRecord::from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .or_else(|err| Error::new_query_error(err, SELECT_PAGE))
    }

    /// Opens a full-record cursor over the whole table.
    pub fn users(&self) -> std::result::Result<UserCursor<'_>, Error> {
        Ok(UserCursor {
            stmt: self
                .con
                .prepare(SELECT_USERS)
                .or_else(|err| Error::new_query_error(err, SELECT_USERS))?,
        })
    }

    /// Opens an age-only cursor, the column stream behind the streaming average.
    pub fn ages(&self) -> std::result::Result<AgeCursor<'_>, Error> {
        Ok(AgeCursor {
            stmt: self
                .con
                .prepare(SELECT_AGES)
                .or_else(|err| Error::new_query_error(err, SELECT_AGES))?,
        })
    }
}

impl PagedSource for UserDataSource {
    fn fetch_page(&self, offset: i64, limit: i64) -> std::result::Result<Vec<UserRecord>, Error> {
        UserDataSource::fetch_page(self, offset, limit)
    }
}

/// A prepared full-table statement held open for one traversal. Dropping the cursor
/// finalizes the statement, also when the consumer abandons iteration early.
pub struct UserCursor<'con> {
    stmt: rusqlite::Statement<'con>,
}

impl UserCursor<'_> {
    pub fn iter(&mut self) -> std::result::Result<UserIter<'_>, Error> {
        Ok(UserIter {
            rows: self
                .stmt
                .query([])
                .or_else(|err| Error::new_query_error(err, SELECT_USERS))?,
            failed: false,
        })
    }
}

/// Single-pass row iterator. A failing step yields `Err` once, then the stream ends.
pub struct UserIter<'stmt> {
    rows: rusqlite::Rows<'stmt>,
    failed: bool,
}

impl Iterator for UserIter<'_> {
    type Item = std::result::Result<UserRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.rows.next() {
            Ok(Some(row)) => match UserRecord::from_row(row) {
                Ok(record) => Some(Ok(record)),
                Err(err) => {
                    self.failed = true;
                    Some(Error::new_query_error(err, SELECT_USERS))
                }
            },
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Error::new_query_error(err, SELECT_USERS))
            }
        }
    }
}

/// Like [`UserCursor`] but for the age column only.
pub struct AgeCursor<'con> {
    stmt: rusqlite::Statement<'con>,
}

impl AgeCursor<'_> {
    pub fn iter(&mut self) -> std::result::Result<AgeIter<'_>, Error> {
        Ok(AgeIter {
            rows: self
                .stmt
                .query([])
                .or_else(|err| Error::new_query_error(err, SELECT_AGES))?,
            failed: false,
        })
    }
}

pub struct AgeIter<'stmt> {
    rows: rusqlite::Rows<'stmt>,
    failed: bool,
}

impl Iterator for AgeIter<'_> {
    type Item = std::result::Result<i64, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.rows.next() {
            Ok(Some(row)) => match get_age(row, 0) {
                Ok(age) => Some(Ok(age)),
                Err(err) => {
                    self.failed = true;
                    Some(Error::new_query_error(err, SELECT_AGES))
                }
            },
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Error::new_query_error(err, SELECT_AGES))
            }
        }
    }
}
