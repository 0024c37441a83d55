//! Error classification and retries for snapshot file I/O.

use std::io::ErrorKind;
use std::thread;
use std::time::Duration;

use crate::error::DbError;

/// Maps an I/O error onto the matching [`DbError`] variant.
///
/// Errors that may go away on their own become
/// [`DbError::TransientIoError`] and are retried by [`with_retries`].
pub fn classify_io_error(error: std::io::Error, context: &str) -> DbError {
    let message = format!("{context}: {error}");
    match error.kind() {
        ErrorKind::StorageFull | ErrorKind::OutOfMemory => DbError::DiskFull(message),
        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted => {
            DbError::TransientIoError(message)
        }
        _ => DbError::IoError(message),
    }
}

/// Runs `operation` until it succeeds, fails with a non-transient error or
/// has been retried `max_retries` times.
pub fn with_retries<T>(
    context: &str,
    max_retries: u32,
    retry_delay_ms: u64,
    mut operation: impl FnMut() -> Result<T, DbError>,
) -> Result<T, DbError> {
    let mut attempt = 0;
    loop {
        match operation() {
            Err(err @ DbError::TransientIoError(_)) if attempt < max_retries => {
                attempt += 1;
                tracing::warn!(
                    "Transient I/O error in {} (attempt {}/{}): {}",
                    context,
                    attempt,
                    max_retries,
                    err
                );
                if retry_delay_ms > 0 {
                    thread::sleep(Duration::from_millis(retry_delay_ms));
                }
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn classifies_by_kind() {
        let full = classify_io_error(io::Error::from(ErrorKind::StorageFull), "write");
        assert!(matches!(full, DbError::DiskFull(_)));

        let interrupted = classify_io_error(io::Error::from(ErrorKind::Interrupted), "write");
        assert!(matches!(interrupted, DbError::TransientIoError(_)));

        let denied = classify_io_error(io::Error::from(ErrorKind::PermissionDenied), "open");
        match denied {
            DbError::IoError(message) => assert!(message.starts_with("open: ")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn retries_transient_errors_only() {
        let mut calls = 0;
        let result: Result<(), DbError> = with_retries("test", 2, 0, || {
            calls += 1;
            Err(DbError::TransientIoError("busy".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);

        let mut calls = 0;
        let result: Result<(), DbError> = with_retries("test", 5, 0, || {
            calls += 1;
            Err(DbError::IoError("gone".into()))
        });
        assert_eq!(result, Err(DbError::IoError("gone".into())));
        assert_eq!(calls, 1);
    }

    #[test]
    fn succeeds_after_transient_failure() {
        let mut calls = 0;
        let result = with_retries("test", 3, 0, || {
            calls += 1;
            if calls < 2 {
                Err(DbError::TransientIoError("busy".into()))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result, Ok(2));
    }
}
