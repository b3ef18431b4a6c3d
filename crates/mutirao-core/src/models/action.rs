//! Action domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Levels are grouped in thousands; the first thousand is reserved for
/// administrative actions.
pub const LEVEL_GROUP_SIZE: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    pub uid: String,
    pub name: String,
    pub description: String,
    /// Priority and authority level of the action.
    pub level: u32,
    /// Action that must already be granted before this one can be.
    pub parent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Action {
    pub fn is_administrative(&self) -> bool {
        self.level < LEVEL_GROUP_SIZE
    }

    /// Thousands group the level belongs to.
    pub fn group(&self) -> u32 {
        self.level / LEVEL_GROUP_SIZE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateAction {
    pub name: String,
    pub description: String,
    pub level: u32,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAction {
    pub name: Option<String>,
    pub description: Option<String>,
    pub level: Option<u32>,
    /// `Some(Some(id))` = set, `Some(None)` = clear, `None` = no change.
    pub parent: Option<Option<String>>,
}
