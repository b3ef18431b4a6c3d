//! Workflow configuration.

/// Configuration for [`VolunteerService`](crate::VolunteerService).
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Serialize role requests per volunteer so that at most one
    /// read-modify-write is in flight for the same record
    /// (default: true).
    pub serialize_requests: bool,
    /// Request every role flagged `initial` when a volunteer registers
    /// (default: true).
    pub allocate_initial_roles: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            serialize_requests: true,
            allocate_initial_roles: true,
        }
    }
}
