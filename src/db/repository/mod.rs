//! Repository module
//!
//! Free functions over `&PgPool`, one file per aggregate. Errors are
//! [`RepoError`] and convert losslessly into [`AppError`](crate::utils::AppError)
//! at the handler boundary.

pub mod cash_closing;
pub mod order;
pub mod user;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already closed: {0}")]
    AlreadyClosed(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        use crate::utils::AppError;
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::InvalidTransition(msg) => AppError::InvalidTransition(msg),
            RepoError::Conflict(msg) => AppError::Conflict(msg),
            RepoError::AlreadyClosed(msg) => AppError::AlreadyClosed(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Whether a sqlx error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    /// Driver-independent stand-in for a database-reported error
    #[derive(Debug)]
    struct StubDbError {
        unique: bool,
    }

    impl fmt::Display for StubDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if self.unique {
                f.write_str("duplicate key value violates unique constraint")
            } else {
                f.write_str("database says no")
            }
        }
    }

    impl StdError for StubDbError {}

    impl sqlx::error::DatabaseError for StubDbError {
        fn message(&self) -> &str {
            if self.unique {
                "duplicate key value violates unique constraint"
            } else {
                "database says no"
            }
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.unique.then(|| Cow::Borrowed("23505"))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.unique {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::Other
            }
        }
    }

    /// A `sqlx::Error::Database` carrying either a unique violation or a
    /// generic database error
    pub(crate) fn db_error(unique: bool) -> sqlx::Error {
        sqlx::Error::Database(Box::new(StubDbError { unique }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_detection() {
        assert!(is_unique_violation(&test_util::db_error(true)));
        assert!(!is_unique_violation(&test_util::db_error(false)));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn repo_errors_map_to_app_errors() {
        use crate::utils::AppError;

        let app: AppError = RepoError::AlreadyClosed("2024-01-01".into()).into();
        assert!(matches!(app, AppError::AlreadyClosed(_)));

        let app: AppError = RepoError::from(test_util::db_error(false)).into();
        assert!(matches!(app, AppError::Database(_)));
    }
}
