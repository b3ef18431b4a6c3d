//! Avatar domain model.

use serde::{Deserialize, Serialize};

use super::actor::ActorKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Avatar {
    pub uid: String,
    /// Fixed at creation; tied to the kind of actor that uses the avatar.
    pub kind: ActorKind,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvatar {
    pub kind: ActorKind,
    pub link: String,
}
