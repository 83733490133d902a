//! Mapping of SQLx errors onto domain errors.

use rc_core::errors::DomainError;
use sqlx::mysql::MySqlDatabaseError;

/// Deadlock found when trying to get lock
const ER_LOCK_DEADLOCK: u16 = 1213;
/// Lock wait timeout exceeded
const ER_LOCK_WAIT_TIMEOUT: u16 = 1205;
/// Duplicate entry for a unique key
const ER_DUP_ENTRY: u16 = 1062;

fn mysql_error_number(err: &sqlx::Error) -> Option<u16> {
    match err {
        sqlx::Error::Database(db) => db
            .try_downcast_ref::<MySqlDatabaseError>()
            .map(|e| e.number()),
        _ => None,
    }
}

/// Whether the error is a unique-key violation
pub fn is_duplicate_key(err: &sqlx::Error) -> bool {
    mysql_error_number(err) == Some(ER_DUP_ENTRY)
}

/// Classify a SQLx error.
///
/// Connection-level failures become `StorageUnavailable`, lock conflicts and
/// duplicate keys become `ConcurrencyConflict`, anything else is `Internal`.
pub fn classify(err: sqlx::Error, context: &str) -> DomainError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            tracing::error!(error = %err, "{}: storage unavailable", context);
            DomainError::StorageUnavailable {
                message: format!("{}: {}", context, err),
            }
        }
        _ => match mysql_error_number(&err) {
            Some(ER_LOCK_DEADLOCK) | Some(ER_LOCK_WAIT_TIMEOUT) | Some(ER_DUP_ENTRY) => {
                tracing::warn!(error = %err, "{}: concurrency conflict", context);
                DomainError::ConcurrencyConflict {
                    message: format!("{}: {}", context, err),
                }
            }
            _ => DomainError::Internal {
                message: format!("{}: {}", context, err),
            },
        },
    }
}
