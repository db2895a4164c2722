use thiserror::Error;

/// Failure taxonomy shared by the store adapters, the record gateway,
/// the HTTP handlers and the client side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Store(String),
    #[error("{0}")]
    Local(String),
    #[error("{0}")]
    Unsupported(String),
}

impl Error {
    pub fn message(&self) -> &str {
        match self {
            Error::Validation(m)
            | Error::NotFound(m)
            | Error::Unauthorized(m)
            | Error::Store(m)
            | Error::Local(m)
            | Error::Unsupported(m) => m,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Store(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Store(value.to_string())
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match &value {
            sqlx::Error::RowNotFound => Self::NotFound(value.to_string()),
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::CheckViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation => Self::Validation(db.message().to_string()),
                _ => Self::Store(db.message().to_string()),
            },
            _ => Self::Store(value.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
