//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Records are addressed by their
//! string storage key; references between records are id strings.

use futures::stream::BoxStream;

use crate::error::MutiraoResult;
use crate::models::{
    action::{Action, CreateAction, UpdateAction},
    avatar::{Avatar, CreateAvatar},
    change::ChangeEvent,
    role::{CreateRole, Role, UpdateRole},
    volunteer::{CreateVolunteer, UpdateVolunteer, Volunteer},
};

/// Upper sentinel appended to a prefix to turn it into a closed range:
/// `field >= prefix AND field <= prefix + PREFIX_SENTINEL`.
pub const PREFIX_SENTINEL: char = '\u{f8ff}';

/// Inclusive `(lower, upper)` bounds matching every string starting with
/// `prefix`.
pub fn prefix_range(prefix: &str) -> (String, String) {
    let mut upper = String::with_capacity(prefix.len() + PREFIX_SENTINEL.len_utf8());
    upper.push_str(prefix);
    upper.push(PREFIX_SENTINEL);
    (prefix.to_string(), upper)
}

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Long-lived stream of changes to a collection.
///
/// The subscription is released when the stream is dropped.
pub type ChangeStream<T> = BoxStream<'static, MutiraoResult<ChangeEvent<T>>>;

// ---------------------------------------------------------------------------
// Volunteers
// ---------------------------------------------------------------------------

pub trait VolunteerRepository: Send + Sync {
    /// Fails with `AlreadyExists` if `input.uid` is already taken.
    fn create(
        &self,
        input: CreateVolunteer,
    ) -> impl Future<Output = MutiraoResult<Volunteer>> + Send;
    fn get_by_id(&self, uid: &str) -> impl Future<Output = MutiraoResult<Volunteer>> + Send;
    /// Overwrite the whole record, recomputing the search name.
    fn replace(
        &self,
        uid: &str,
        volunteer: Volunteer,
    ) -> impl Future<Output = MutiraoResult<Volunteer>> + Send;
    fn update(
        &self,
        uid: &str,
        input: UpdateVolunteer,
    ) -> impl Future<Output = MutiraoResult<Volunteer>> + Send;
    /// Atomically add `role_id` to the pending list. Returns `false` if it
    /// was already there.
    fn add_pending_role(
        &self,
        uid: &str,
        role_id: &str,
    ) -> impl Future<Output = MutiraoResult<bool>> + Send;
    /// Atomically remove `role_id` from the pending list. Returns `false`
    /// if it was not there.
    fn remove_pending_role(
        &self,
        uid: &str,
        role_id: &str,
    ) -> impl Future<Output = MutiraoResult<bool>> + Send;
    /// Soft-delete: moves the record into the removed-volunteer archive.
    fn delete(&self, uid: &str) -> impl Future<Output = MutiraoResult<()>> + Send;
    fn get_removed(&self, uid: &str) -> impl Future<Output = MutiraoResult<Volunteer>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = MutiraoResult<PaginatedResult<Volunteer>>> + Send;
    /// Case-insensitive name prefix search.
    fn search_by_name(
        &self,
        prefix: &str,
    ) -> impl Future<Output = MutiraoResult<Vec<Volunteer>>> + Send;
    /// Volunteers ordered by age, starting at `min_age`.
    fn search_by_age(
        &self,
        min_age: u32,
    ) -> impl Future<Output = MutiraoResult<Vec<Volunteer>>> + Send;
    fn watch(&self) -> impl Future<Output = MutiraoResult<ChangeStream<Volunteer>>> + Send;
}

// ---------------------------------------------------------------------------
// Roles & actions
// ---------------------------------------------------------------------------

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = MutiraoResult<Role>> + Send;
    fn get_by_id(&self, uid: &str) -> impl Future<Output = MutiraoResult<Role>> + Send;
    fn replace(&self, uid: &str, role: Role) -> impl Future<Output = MutiraoResult<Role>> + Send;
    fn update(
        &self,
        uid: &str,
        input: UpdateRole,
    ) -> impl Future<Output = MutiraoResult<Role>> + Send;
    fn delete(&self, uid: &str) -> impl Future<Output = MutiraoResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = MutiraoResult<PaginatedResult<Role>>> + Send;
    /// Name prefix search (case-sensitive, roles have no search index).
    fn search_by_name(
        &self,
        prefix: &str,
    ) -> impl Future<Output = MutiraoResult<Vec<Role>>> + Send;
    /// Roles requested automatically for new volunteers.
    fn list_initial(&self) -> impl Future<Output = MutiraoResult<Vec<Role>>> + Send;
    fn watch(&self) -> impl Future<Output = MutiraoResult<ChangeStream<Role>>> + Send;
}

pub trait ActionRepository: Send + Sync {
    fn create(&self, input: CreateAction) -> impl Future<Output = MutiraoResult<Action>> + Send;
    fn get_by_id(&self, uid: &str) -> impl Future<Output = MutiraoResult<Action>> + Send;
    fn update(
        &self,
        uid: &str,
        input: UpdateAction,
    ) -> impl Future<Output = MutiraoResult<Action>> + Send;
    fn delete(&self, uid: &str) -> impl Future<Output = MutiraoResult<()>> + Send;
    /// All actions ordered by level.
    fn list(&self) -> impl Future<Output = MutiraoResult<Vec<Action>>> + Send;
}

// ---------------------------------------------------------------------------
// Avatars
// ---------------------------------------------------------------------------

pub trait AvatarRepository: Send + Sync {
    fn create(&self, input: CreateAvatar) -> impl Future<Output = MutiraoResult<Avatar>> + Send;
    fn get_by_id(&self, uid: &str) -> impl Future<Output = MutiraoResult<Avatar>> + Send;
    fn delete(&self, uid: &str) -> impl Future<Output = MutiraoResult<()>> + Send;
    fn list(&self) -> impl Future<Output = MutiraoResult<Vec<Avatar>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_range_appends_sentinel() {
        let (lower, upper) = prefix_range("an");
        assert_eq!(lower, "an");
        assert_eq!(upper, "an\u{f8ff}");
        assert!("ana".to_string() >= lower && "ana".to_string() <= upper);
        assert!("anaïs".to_string() <= upper);
        assert!("bruno".to_string() > upper);
        assert!("am".to_string() < lower);
    }
}
