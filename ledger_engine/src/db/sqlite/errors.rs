use log::*;

use crate::db::traits::{AccountApiError, LedgerError};

/// SQLite result codes that mean "somebody else holds the lock": `SQLITE_BUSY`, `SQLITE_LOCKED` and their extended
/// variants `BUSY_RECOVERY`, `LOCKED_SHAREDCACHE` and `BUSY_SNAPSHOT`.
const LOCK_CONTENTION_CODES: [&str; 5] = ["5", "6", "261", "262", "517"];

pub(crate) fn is_lock_contention(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(e) => {
            matches!(e.code().as_deref(), Some(code) if LOCK_CONTENTION_CODES.contains(&code)) ||
                e.message().contains("database is locked")
        },
        sqlx::Error::PoolTimedOut => true,
        _ => false,
    }
}

/// A foreign key violation on `user_id` means the user account does not exist.
pub(crate) fn user_not_found_or_other(err: sqlx::Error, user_id: i64) -> LedgerError {
    match &err {
        sqlx::Error::Database(e) if e.is_foreign_key_violation() => LedgerError::UserNotFound(user_id),
        _ => LedgerError::from(err),
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        if is_lock_contention(&e) {
            debug!("🗃️ Lock contention: {e}");
            LedgerError::TransactionConflict(e.to_string())
        } else {
            LedgerError::DatabaseError(e.to_string())
        }
    }
}

impl From<sqlx::migrate::MigrateError> for LedgerError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        LedgerError::DatabaseError(format!("Migration failed: {e}"))
    }
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use std::{borrow::Cow, error::Error, fmt::Display};

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    #[derive(Debug)]
    struct SqliteFailure {
        code: &'static str,
        message: &'static str,
    }

    impl Display for SqliteFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "({}) {}", self.code, self.message)
        }
    }

    impl Error for SqliteFailure {}

    impl DatabaseError for SqliteFailure {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.code {
                "787" => ErrorKind::ForeignKeyViolation,
                "2067" => ErrorKind::UniqueViolation,
                "275" => ErrorKind::CheckViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn failure(code: &'static str, message: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(SqliteFailure { code, message }))
    }

    #[test]
    fn lock_contention_codes() {
        for code in ["5", "6", "261", "262", "517"] {
            assert!(is_lock_contention(&failure(code, "busy")), "code {code} should be lock contention");
        }
        assert!(is_lock_contention(&failure("1", "database is locked")));
        assert!(is_lock_contention(&sqlx::Error::PoolTimedOut));
        assert!(!is_lock_contention(&failure("2067", "UNIQUE constraint failed: user_accounts.login")));
        assert!(!is_lock_contention(&failure("787", "FOREIGN KEY constraint failed")));
        assert!(!is_lock_contention(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn contention_is_transient() {
        assert!(matches!(LedgerError::from(failure("5", "database is locked")), LedgerError::TransactionConflict(_)));
        assert!(LedgerError::from(failure("517", "busy snapshot")).is_transient());
        let err = LedgerError::from(failure("275", "CHECK constraint failed: amount > 0"));
        assert!(matches!(err, LedgerError::DatabaseError(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn missing_users_are_named() {
        let err = user_not_found_or_other(failure("787", "FOREIGN KEY constraint failed"), 42);
        assert!(matches!(err, LedgerError::UserNotFound(42)));
        let err = user_not_found_or_other(failure("5", "database is locked"), 42);
        assert!(matches!(err, LedgerError::TransactionConflict(_)));
    }
}
