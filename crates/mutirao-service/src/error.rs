//! Workflow error types.

use mutirao_core::error::MutiraoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("role has no identity")]
    RoleWithoutId,

    #[error("volunteer {volunteer} already holds role {role}")]
    RoleAlreadyGranted { volunteer: String, role: String },

    #[error("action {action} requires {parent} to be granted first")]
    ParentActionNotGranted { action: String, parent: String },

    #[error("action {action} is required by granted action {child}")]
    ActionRequiredByChild { action: String, child: String },
}

impl From<WorkflowError> for MutiraoError {
    fn from(err: WorkflowError) -> Self {
        MutiraoError::Validation {
            message: err.to_string(),
        }
    }
}
