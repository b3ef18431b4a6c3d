//! Volunteer domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::visitor::Visitor;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Volunteer {
    /// Empty only for records written without an identity; watchers
    /// back-fill it from the storage key.
    pub uid: String,
    pub name: String,
    pub surname: String,
    /// Lowercased `name`, used for prefix search.
    pub name_to_search: String,
    pub age: Option<u32>,
    pub email: Option<String>,
    /// Avatar id, or a plain image URL for avatars not stored in the system.
    pub avatar: Option<String>,
    /// Granted role ids.
    pub roles: Vec<String>,
    /// Requested role ids awaiting a decision.
    pub pending_roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Volunteer {
    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|r| r == role_id)
    }

    pub fn has_pending_role(&self, role_id: &str) -> bool {
        self.pending_roles.iter().any(|r| r == role_id)
    }
}

/// Search key derived from a display name.
pub fn search_name(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateVolunteer {
    /// `None` lets the repository generate an id.
    pub uid: Option<String>,
    pub name: String,
    pub surname: String,
    pub age: Option<u32>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

impl CreateVolunteer {
    /// Builds the registration input for a visitor: the first word of the
    /// display name becomes the name, the rest the surname.
    pub fn from_visitor(visitor: &Visitor) -> Self {
        let display_name = visitor.display_name.trim();
        let (name, surname) = match display_name.split_once(char::is_whitespace) {
            Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
            None => (display_name.to_string(), String::new()),
        };

        Self {
            uid: Some(visitor.uid.clone()),
            name,
            surname,
            age: None,
            email: (!visitor.email.is_empty()).then(|| visitor.email.clone()),
            avatar: (!visitor.photo_url.is_empty()).then(|| visitor.photo_url.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateVolunteer {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub age: Option<u32>,
    pub email: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub avatar: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_name_is_lowercase() {
        assert_eq!(search_name("Ana Júlia"), "ana júlia");
    }

    #[test]
    fn visitor_display_name_is_split() {
        let visitor = Visitor {
            uid: "u1".into(),
            email: "ana@example.com".into(),
            display_name: "Ana Maria  Souza".into(),
            photo_url: String::new(),
            email_verified: true,
        };

        let input = CreateVolunteer::from_visitor(&visitor);
        assert_eq!(input.uid.as_deref(), Some("u1"));
        assert_eq!(input.name, "Ana");
        assert_eq!(input.surname, "Maria  Souza");
        assert_eq!(input.email.as_deref(), Some("ana@example.com"));
        assert_eq!(input.avatar, None);
    }

    #[test]
    fn single_word_display_name_has_no_surname() {
        let visitor = Visitor {
            uid: "u1".into(),
            display_name: "Ana".into(),
            photo_url: "https://img.example/ana.png".into(),
            ..Default::default()
        };

        let input = CreateVolunteer::from_visitor(&visitor);
        assert_eq!(input.name, "Ana");
        assert_eq!(input.surname, "");
        assert_eq!(input.email, None);
        assert_eq!(input.avatar.as_deref(), Some("https://img.example/ana.png"));
    }
}
