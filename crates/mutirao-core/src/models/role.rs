//! Role domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::actor::ActorKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    /// Empty only for records written without an identity.
    pub uid: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub kind: ActorKind,
    /// Requested automatically for every newly registered volunteer.
    pub initial: bool,
    /// Permitted action ids, in grant order, without duplicates.
    pub actions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn allows(&self, action_id: &str) -> bool {
        self.actions.iter().any(|a| a == action_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateRole {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub kind: ActorKind,
    pub initial: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub initial: Option<bool>,
    pub actions: Option<Vec<String>>,
}
