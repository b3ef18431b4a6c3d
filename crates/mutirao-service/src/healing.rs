//! Self-healing change watchers.
//!
//! Records written without their `uid` field (hand edits, old imports)
//! are repaired the first time a watcher observes them: the uid is
//! back-filled from the storage key, the record is persisted, and the
//! corrected record is what the stream yields. Removed records are only
//! corrected in the yielded event.

use std::sync::Arc;

use futures::StreamExt;
use mutirao_core::error::MutiraoResult;
use mutirao_core::models::role::Role;
use mutirao_core::models::volunteer::Volunteer;
use mutirao_core::repository::{ChangeStream, RoleRepository, VolunteerRepository};
use tracing::info;

/// Records that carry their own identity.
pub trait Identified {
    fn uid(&self) -> &str;
    fn set_uid(&mut self, uid: String);
}

impl Identified for Volunteer {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn set_uid(&mut self, uid: String) {
        self.uid = uid;
    }
}

impl Identified for Role {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn set_uid(&mut self, uid: String) {
        self.uid = uid;
    }
}

/// Wrap `stream` so that records missing their uid are repaired through
/// `persist(key, record)` before being yielded.
pub fn heal<T, F, Fut>(stream: ChangeStream<T>, entity: &'static str, persist: F) -> ChangeStream<T>
where
    T: Identified + Send + 'static,
    F: Fn(String, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MutiraoResult<T>> + Send + 'static,
{
    let persist = Arc::new(persist);

    stream
        .then(move |item| {
            let persist = Arc::clone(&persist);
            async move {
                let mut event = item?;
                let Some(mut record) = event
                    .data
                    .take_if(|record| record.uid().is_empty())
                else {
                    return Ok(event);
                };

                record.set_uid(event.key.clone());
                if event.exists {
                    info!(entity, key = %event.key, "Back-filling missing uid");
                    record = persist(event.key.clone(), record).await?;
                }
                event.data = Some(record);
                Ok(event)
            }
        })
        .boxed()
}

/// Watch the volunteer collection, repairing records without a uid.
///
/// Dropping the returned stream releases the subscription.
pub async fn watch_volunteers<V>(repo: &V) -> MutiraoResult<ChangeStream<Volunteer>>
where
    V: VolunteerRepository + Clone + 'static,
{
    let stream = repo.watch().await?;
    let repo = repo.clone();

    Ok(heal(stream, "volunteer", move |key, volunteer| {
        let repo = repo.clone();
        async move { repo.replace(&key, volunteer).await }
    }))
}

/// Watch the role collection, repairing records without a uid.
pub async fn watch_roles<R>(repo: &R) -> MutiraoResult<ChangeStream<Role>>
where
    R: RoleRepository + Clone + 'static,
{
    let stream = repo.watch().await?;
    let repo = repo.clone();

    Ok(heal(stream, "role", move |key, role| {
        let repo = repo.clone();
        async move { repo.replace(&key, role).await }
    }))
}
