//! Database-specific error types and conversions.

use mutirao_core::error::MutiraoError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid stored value: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity} with id {id}")]
    AlreadyExists { entity: String, id: String },
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<DbError> for MutiraoError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => MutiraoError::NotFound { entity, id },
            DbError::AlreadyExists { entity, id } => MutiraoError::AlreadyExists { entity, id },
            other => MutiraoError::Database(other.to_string()),
        }
    }
}
