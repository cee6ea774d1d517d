//! Custom error types for the common library
//!
//! This module defines the database and storage errors shared by every
//! repository implementation.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Error returned by the credential and content stores
#[derive(Error, Debug)]
pub enum StoreError {
    /// A user with the same username already exists
    #[error("Username already registered: {0}")]
    DuplicateUsername(String),

    /// The password could not be hashed
    #[error("Password hashing error: {0}")]
    Hashing(String),

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl StoreError {
    /// Classify a failed insert, turning unique violations into `DuplicateUsername`
    pub fn from_insert(err: SqlxError, username: &str) -> Self {
        match &err {
            SqlxError::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateUsername(username.to_string())
            }
            _ => StoreError::Database(DatabaseError::Query(err)),
        }
    }
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_insert_errors_stay_query_errors() {
        let err = StoreError::from_insert(SqlxError::RowNotFound, "alice");
        assert!(matches!(
            err,
            StoreError::Database(DatabaseError::Query(SqlxError::RowNotFound))
        ));
    }

    #[test]
    fn duplicate_username_message_names_the_user() {
        let err = StoreError::DuplicateUsername("alice".to_string());
        assert_eq!(err.to_string(), "Username already registered: alice");
    }
}
