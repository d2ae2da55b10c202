use sqlx::PgPool;

use crate::app_error::AppError;

pub mod account;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                tracing::debug!(
                    constraint = ?db_err.constraint(),
                    "Unique constraint rejected write"
                );
                AppError::Conflict("A record with this value already exists".into())
            }
            _ => {
                // Log the actual error for debugging, but don't expose details
                tracing::error!(error = ?err, "Database error");
                AppError::TransientStore("Database operation failed".into())
            }
        }
    }
}
