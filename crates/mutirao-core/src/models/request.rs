//! Outcomes of a role request.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoleRequestStatus {
    /// The role was added to the volunteer's pending list.
    Pending,
    /// A pending request for the role was withdrawn.
    Cancelled,
    /// Produced by administrative approval, never by a request itself.
    Authorized,
    /// Produced by administrative denial, never by a request itself.
    Denied,
}

impl RoleRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleRequestStatus::Pending => "pending",
            RoleRequestStatus::Cancelled => "cancelled",
            RoleRequestStatus::Authorized => "authorized",
            RoleRequestStatus::Denied => "denied",
        }
    }
}

impl fmt::Display for RoleRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
