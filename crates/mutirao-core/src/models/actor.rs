//! Actor categories shared by roles and avatars.

use serde::{Deserialize, Serialize};

/// Which kind of actor a role or avatar applies to.
///
/// Stored as its numeric code so that gaps in the numbering stay
/// available for future categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ActorKind {
    /// Volunteers and other individuals (code 0).
    #[default]
    Individual,
    /// Non-human entities managed by someone else, such as pets (code 1).
    Managed,
    /// Organizations and legal entities (code 20).
    Organization,
    /// Support systems, microservices and embedded devices (code 50).
    Service,
}

impl ActorKind {
    pub fn code(self) -> i64 {
        match self {
            ActorKind::Individual => 0,
            ActorKind::Managed => 1,
            ActorKind::Organization => 20,
            ActorKind::Service => 50,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ActorKind::Individual),
            1 => Some(ActorKind::Managed),
            20 => Some(ActorKind::Organization),
            50 => Some(ActorKind::Service),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_stored_values() {
        for kind in [
            ActorKind::Individual,
            ActorKind::Managed,
            ActorKind::Organization,
            ActorKind::Service,
        ] {
            assert_eq!(ActorKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ActorKind::Organization.code(), 20);
        assert_eq!(ActorKind::Service.code(), 50);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(ActorKind::from_code(2), None);
        assert_eq!(ActorKind::from_code(-1), None);
    }
}
