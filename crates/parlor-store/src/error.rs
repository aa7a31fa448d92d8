//! Error types for the storage layer.

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An insert collided with an existing primary key (duplicate session
    /// code).
    #[error("session code already exists")]
    Conflict,

    /// The requested row does not exist.
    #[error("row not found")]
    NotFound,

    /// Any other database failure.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps raw sqlx errors onto the store's own taxonomy.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(ref db)
                if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                Self::Conflict
            }
            other => Self::Database(other),
        }
    }
}
