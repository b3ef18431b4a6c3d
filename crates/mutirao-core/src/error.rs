//! Error types for the Mutirão system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MutiraoError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity} with id {id}")]
    AlreadyExists { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Change stream closed: {0}")]
    StreamClosed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MutiraoError {
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type MutiraoResult<T> = Result<T, MutiraoError>;
