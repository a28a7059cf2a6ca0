#[cfg_attr(test, derive(Debug))]
#[derive(Clone, PartialEq)]
pub enum Error {
    /// No candidate database path could be opened and verified.
    ConnectionError { message: String, attempts: Vec<String> },
    /// A SQL statement failed.
    QueryError { message: String, query: String },
    /// CSV, I/O, and serialization failures.
    OtherError { message: String },
}

impl Error {
    pub fn new_query_error<T, U: Into<String>>(err: rusqlite::Error, query: U) -> std::result::Result<T, Self> {
        Err(Self::QueryError {
            message: format!("{err}"),
            query: query.into(),
        })
    }

    pub fn new_connection_error<T, U: Into<String>>(msg: U, attempts: Vec<String>) -> std::result::Result<T, Self> {
        Err(Self::ConnectionError {
            message: msg.into(),
            attempts,
        })
    }

    pub fn new_other_error<T, U: Into<String>>(msg: U) -> std::result::Result<T, Self> {
        Err(Self::OtherError { message: msg.into() })
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError { message, attempts } => {
                write!(f, "{}", message)?;
                for attempt in attempts {
                    write!(f, "\n- {}", attempt)?;
                }
                Ok(())
            }
            Self::QueryError { message, query } => {
                write!(f, "{}\nQuery: {}", message, query)
            }
            Self::OtherError { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Self::OtherError {
            message: format!("{value}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::OtherError {
            message: format!("{value}"),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::OtherError {
            message: format!("{value}"),
        }
    }
}
