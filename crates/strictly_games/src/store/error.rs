//! Storage error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Broad classification of a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DbErrorKind {
    /// The database rejected or failed a query.
    #[display("query")]
    Query,
    /// A concurrent change won; the caller may retry with a fresh snapshot.
    #[display("conflict")]
    Conflict,
    /// The requested row does not exist.
    #[display("not found")]
    NotFound,
    /// Stored data could not be read back into domain types.
    #[display("corrupt")]
    Corrupt,
    /// The requesting player may not change this row.
    #[display("forbidden")]
    Forbidden,
}

/// Database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error ({}): {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure class.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new query error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Query, message)
    }

    /// Creates an error of the given kind with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn with_kind(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// A guarded write found the game in a different state than expected.
    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Conflict, message)
    }

    /// The row the caller asked for does not exist.
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::NotFound, message)
    }

    /// A stored value could not be parsed.
    #[track_caller]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Corrupt, message)
    }

    /// The requester lacks the right to perform the change.
    #[track_caller]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Forbidden, message)
    }

    /// Returns true if retrying against a fresh snapshot may succeed.
    pub fn is_conflict(&self) -> bool {
        self.kind == DbErrorKind::Conflict
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        let kind = match &err {
            Error::NotFound => DbErrorKind::NotFound,
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
            | Error::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
                DbErrorKind::Conflict
            }
            // SQLite reports lock contention as an unclassified error.
            Error::DatabaseError(_, info) if info.message().contains("locked") => {
                DbErrorKind::Conflict
            }
            _ => DbErrorKind::Query,
        };
        Self::with_kind(kind, format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(format!("Connection error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_kind() {
        let err = DbError::from(diesel::result::Error::NotFound);
        assert_eq!(err.kind, DbErrorKind::NotFound);
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_conflict_message() {
        let err = DbError::conflict("Turn already advanced");
        assert!(err.is_conflict());
        assert!(err.to_string().contains("conflict"));
        assert!(err.to_string().contains("Turn already advanced"));
    }
}
