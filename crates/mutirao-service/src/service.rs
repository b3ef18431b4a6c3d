//! Volunteer service — role requests, registration and role resolution.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use futures::future::join_all;
use mutirao_core::error::MutiraoResult;
use mutirao_core::models::request::RoleRequestStatus;
use mutirao_core::models::role::Role;
use mutirao_core::models::visitor::Visitor;
use mutirao_core::models::volunteer::{CreateVolunteer, Volunteer};
use mutirao_core::repository::{RoleRepository, VolunteerRepository};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::config::WorkflowConfig;
use crate::error::WorkflowError;

/// One async lock per volunteer with a request in flight.
///
/// Entries are dropped again once nobody holds or waits for them,
/// including when a waiting request is cancelled.
#[derive(Default)]
struct RequestLocks {
    inner: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RequestLocks {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn acquire(&self, uid: &str) -> RequestGuard<'_> {
        let lock = Arc::clone(self.entries().entry(uid.to_string()).or_default());
        let mut guard = RequestGuard {
            locks: self,
            uid: uid.to_string(),
            held: None,
        };
        guard.held = Some(lock.lock_owned().await);
        guard
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries().len()
    }
}

/// Holds a volunteer's request lock; removes the map entry on drop once
/// it is unused.
struct RequestGuard<'a> {
    locks: &'a RequestLocks,
    uid: String,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.held.take();
        let mut locks = self.locks.entries();
        // Our own clone of the Arc is gone, so only the map's remains.
        if locks.get(&self.uid).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&self.uid);
        }
    }
}

/// Volunteer service.
///
/// Generic over repository implementations so that the workflow has no
/// dependency on the database crate.
pub struct VolunteerService<V: VolunteerRepository, R: RoleRepository> {
    volunteers: V,
    roles: R,
    config: WorkflowConfig,
    locks: RequestLocks,
}

impl<V: VolunteerRepository, R: RoleRepository> VolunteerService<V, R> {
    pub fn new(volunteers: V, roles: R, config: WorkflowConfig) -> Self {
        Self {
            volunteers,
            roles,
            config,
            locks: RequestLocks::default(),
        }
    }

    /// Toggle `role` in the volunteer's pending list.
    ///
    /// Adds the role and reports [`RoleRequestStatus::Pending`] when it
    /// was not pending; removes it and reports
    /// [`RoleRequestStatus::Cancelled`] when it was. Performs exactly one
    /// write to the pending list.
    pub async fn request_role(
        &self,
        volunteer_uid: &str,
        role: &Role,
    ) -> MutiraoResult<RoleRequestStatus> {
        if role.uid.is_empty() {
            return Err(WorkflowError::RoleWithoutId.into());
        }

        let guard = if self.config.serialize_requests {
            Some(self.locks.acquire(volunteer_uid).await)
        } else {
            None
        };

        let outcome = self.toggle_pending(volunteer_uid, &role.uid).await;
        drop(guard);

        let status = outcome?;
        info!(
            volunteer = volunteer_uid,
            role = %role.uid,
            status = %status,
            "Role request processed"
        );
        Ok(status)
    }

    async fn toggle_pending(
        &self,
        volunteer_uid: &str,
        role_uid: &str,
    ) -> MutiraoResult<RoleRequestStatus> {
        let volunteer = self.volunteers.get_by_id(volunteer_uid).await?;

        if volunteer.has_role(role_uid) {
            return Err(WorkflowError::RoleAlreadyGranted {
                volunteer: volunteer_uid.to_string(),
                role: role_uid.to_string(),
            }
            .into());
        }

        if volunteer.has_pending_role(role_uid) {
            let removed = self
                .volunteers
                .remove_pending_role(volunteer_uid, role_uid)
                .await?;
            if !removed {
                debug!(volunteer = volunteer_uid, role = role_uid, "Request already withdrawn");
            }
            Ok(RoleRequestStatus::Cancelled)
        } else {
            let added = self
                .volunteers
                .add_pending_role(volunteer_uid, role_uid)
                .await?;
            if !added {
                debug!(volunteer = volunteer_uid, role = role_uid, "Request already pending");
            }
            Ok(RoleRequestStatus::Pending)
        }
    }

    /// Create a volunteer and request every initial role for it.
    ///
    /// All requests run concurrently and are allowed to settle before the
    /// first failure, if any, is returned. Fails with `AlreadyExists` when
    /// the id is taken, without touching the existing record.
    pub async fn register(&self, input: CreateVolunteer) -> MutiraoResult<Volunteer> {
        let volunteer = self.volunteers.create(input).await?;
        if !self.config.allocate_initial_roles {
            return Ok(volunteer);
        }

        let initial = self.roles.list_initial().await?;
        let uid = volunteer.uid.clone();

        let results = join_all(initial.iter().map(|role| self.request_role(&uid, role))).await;
        for (role, result) in initial.iter().zip(results) {
            if let Err(e) = result {
                warn!(volunteer = %uid, role = %role.uid, error = %e, "Initial role request failed");
                return Err(e);
            }
        }

        info!(volunteer = %uid, initial_roles = initial.len(), "Volunteer registered");
        self.volunteers.get_by_id(&uid).await
    }

    /// Allocate a volunteer for an authenticated visitor.
    pub async fn register_visitor(&self, visitor: &Visitor) -> MutiraoResult<Volunteer> {
        self.register(CreateVolunteer::from_visitor(visitor)).await
    }

    /// Fetch every referenced role. Returns `None` if any reference fails
    /// to resolve; never a partial list.
    pub async fn resolve_roles(&self, ids: &[String]) -> Option<Vec<Role>> {
        let results = join_all(ids.iter().map(|id| self.roles.get_by_id(id))).await;

        let mut roles = Vec::with_capacity(ids.len());
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(role) => roles.push(role),
                Err(e) => {
                    warn!(role = %id, error = %e, "Role reference failed to resolve");
                    return None;
                }
            }
        }
        Some(roles)
    }

    /// The volunteer's granted roles, resolved all-or-nothing.
    pub async fn granted_roles(&self, volunteer_uid: &str) -> MutiraoResult<Option<Vec<Role>>> {
        let volunteer = self.volunteers.get_by_id(volunteer_uid).await?;
        Ok(self.resolve_roles(&volunteer.roles).await)
    }

    /// The volunteer's pending roles, resolved all-or-nothing.
    pub async fn pending_roles(&self, volunteer_uid: &str) -> MutiraoResult<Option<Vec<Role>>> {
        let volunteer = self.volunteers.get_by_id(volunteer_uid).await?;
        Ok(self.resolve_roles(&volunteer.pending_roles).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn locks_serialize_same_volunteer() {
        let locks = Arc::new(RequestLocks::default());
        let first = locks.acquire("v1").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("v1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn locks_do_not_block_other_volunteers() {
        let locks = RequestLocks::default();
        let a = locks.acquire("v1").await;
        let b = locks.acquire("v2").await;
        assert_eq!(locks.len(), 2);

        drop(a);
        drop(b);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn cancelled_waiter_leaves_no_entry() {
        let locks = Arc::new(RequestLocks::default());
        let first = locks.acquire("v1").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("v1").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        waiter.abort();
        assert!(waiter.await.unwrap_err().is_cancelled());

        drop(first);
        assert_eq!(locks.len(), 0);
    }
}
