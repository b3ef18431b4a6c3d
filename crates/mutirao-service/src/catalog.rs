//! Role catalog — granting actions to roles.
//!
//! An action with a parent can only be granted to a role that already
//! holds the parent, and a parent cannot be revoked while a granted
//! child still depends on it.

use mutirao_core::error::MutiraoResult;
use mutirao_core::models::role::{Role, UpdateRole};
use mutirao_core::repository::{ActionRepository, RoleRepository};
use tracing::info;

use crate::error::WorkflowError;

pub struct RoleCatalog<R: RoleRepository, A: ActionRepository> {
    roles: R,
    actions: A,
}

impl<R: RoleRepository, A: ActionRepository> RoleCatalog<R, A> {
    pub fn new(roles: R, actions: A) -> Self {
        Self { roles, actions }
    }

    /// Add `action_uid` to the role's actions. Granting an action the
    /// role already holds is a no-op.
    pub async fn grant_action(&self, role_uid: &str, action_uid: &str) -> MutiraoResult<Role> {
        let role = self.roles.get_by_id(role_uid).await?;
        let action = self.actions.get_by_id(action_uid).await?;

        if role.allows(action_uid) {
            return Ok(role);
        }

        if let Some(parent) = action.parent.as_deref() {
            if !role.allows(parent) {
                return Err(WorkflowError::ParentActionNotGranted {
                    action: action_uid.to_string(),
                    parent: parent.to_string(),
                }
                .into());
            }
        }

        let mut actions = role.actions;
        actions.push(action_uid.to_string());

        let updated = self
            .roles
            .update(
                role_uid,
                UpdateRole {
                    actions: Some(actions),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            role = role_uid,
            action = action_uid,
            level = action.level,
            administrative = action.is_administrative(),
            "Action granted"
        );
        Ok(updated)
    }

    /// Remove `action_uid` from the role's actions.
    pub async fn revoke_action(&self, role_uid: &str, action_uid: &str) -> MutiraoResult<Role> {
        let role = self.roles.get_by_id(role_uid).await?;
        if !role.allows(action_uid) {
            return Ok(role);
        }

        // Granted ids whose action was deleted never match here.
        let dependent = self.actions.list().await?.into_iter().find(|child| {
            child.parent.as_deref() == Some(action_uid) && role.allows(&child.uid)
        });
        if let Some(child) = dependent {
            return Err(WorkflowError::ActionRequiredByChild {
                action: action_uid.to_string(),
                child: child.uid,
            }
            .into());
        }

        let actions = role
            .actions
            .into_iter()
            .filter(|a| a != action_uid)
            .collect();

        let updated = self
            .roles
            .update(
                role_uid,
                UpdateRole {
                    actions: Some(actions),
                    ..Default::default()
                },
            )
            .await?;

        info!(role = role_uid, action = action_uid, "Action revoked");
        Ok(updated)
    }
}
