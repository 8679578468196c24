use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("write conflict")]
    Conflict,
}

/// Maps transient Postgres write failures (serialization aborts, deadlocks)
/// to `Conflict` so callers can apply their bounded-retry policy.
pub fn classify_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if let Some(code) = db_err.code() {
            if code == "40001" || code == "40P01" {
                return StoreError::Conflict;
            }
        }
    }
    StoreError::Db(err)
}

pub type StoreResult<T> = Result<T, StoreError>;
