//! SurrealDB implementation of [`RoleRepository`].

use chrono::{DateTime, Utc};
use mutirao_core::error::MutiraoResult;
use mutirao_core::models::role::{CreateRole, Role, UpdateRole};
use mutirao_core::repository::{
    ChangeStream, PaginatedResult, Pagination, RoleRepository, prefix_range,
};
use surrealdb::{Connection, Notification, Surreal};
use surrealdb_types::SurrealValue;

use super::{CountRow, actor_kind, first_row, id_or_generate, live_events};
use crate::error::DbError;

const SELECT_ONE: &str = "SELECT * FROM type::record('role', $id)";

#[derive(Debug, SurrealValue)]
struct RoleRow {
    uid: Option<String>,
    name: String,
    description: String,
    icon: String,
    kind: i64,
    initial: bool,
    actions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn try_into_role(self) -> Result<Role, DbError> {
        Ok(Role {
            uid: self.uid.unwrap_or_default(),
            name: self.name,
            description: self.description,
            icon: self.icon,
            kind: actor_kind(self.kind)?,
            initial: self.initial,
            actions: self.actions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_roles(rows: Vec<RoleRow>) -> Result<Vec<Role>, DbError> {
    rows.into_iter().map(RoleRow::try_into_role).collect()
}

#[derive(Debug, SurrealValue)]
struct LiveRoleRow {
    record_id: String,
    uid: Option<String>,
    name: Option<String>,
    description: Option<String>,
    icon: Option<String>,
    kind: Option<i64>,
    initial: Option<bool>,
    actions: Option<Vec<String>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl LiveRoleRow {
    fn into_parts(self) -> (String, Option<Role>) {
        let kind = self.kind.and_then(|code| actor_kind(code).ok());
        let role = match (self.name, kind, self.created_at, self.updated_at) {
            (Some(name), Some(kind), Some(created_at), Some(updated_at)) => Some(Role {
                uid: self.uid.unwrap_or_default(),
                name,
                description: self.description.unwrap_or_default(),
                icon: self.icon.unwrap_or_default(),
                kind,
                initial: self.initial.unwrap_or(false),
                actions: self.actions.unwrap_or_default(),
                created_at,
                updated_at,
            }),
            _ => None,
        };
        (self.record_id, role)
    }
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> MutiraoResult<Role> {
        let id = id_or_generate(None);

        let result = self
            .db
            .query(format!(
                "CREATE type::record('role', $id) SET \
                 uid = $id, name = $name, description = $description, \
                 icon = $icon, kind = $kind, initial = $initial; \
                 {SELECT_ONE};"
            ))
            .bind(("id", id.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("icon", input.icon))
            .bind(("kind", input.kind.code()))
            .bind(("initial", input.initial))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "role", &id)?.try_into_role()?)
    }

    async fn get_by_id(&self, uid: &str) -> MutiraoResult<Role> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", uid.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "role", uid)?.try_into_role()?)
    }

    async fn replace(&self, uid: &str, role: Role) -> MutiraoResult<Role> {
        let result = self
            .db
            .query(format!(
                "UPSERT type::record('role', $id) SET \
                 uid = $id, name = $name, description = $description, \
                 icon = $icon, kind = $kind, initial = $initial, \
                 actions = $actions, updated_at = time::now(); \
                 {SELECT_ONE};"
            ))
            .bind(("id", uid.to_string()))
            .bind(("name", role.name))
            .bind(("description", role.description))
            .bind(("icon", role.icon))
            .bind(("kind", role.kind.code()))
            .bind(("initial", role.initial))
            .bind(("actions", role.actions))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "role", uid)?.try_into_role()?)
    }

    async fn update(&self, uid: &str, input: UpdateRole) -> MutiraoResult<Role> {
        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.icon.is_some() {
            sets.push("icon = $icon");
        }
        if input.initial.is_some() {
            sets.push("initial = $initial");
        }
        if input.actions.is_some() {
            sets.push("actions = $actions");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('role', $id) SET {}; {SELECT_ONE};",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", uid.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(icon) = input.icon {
            builder = builder.bind(("icon", icon));
        }
        if let Some(initial) = input.initial {
            builder = builder.bind(("initial", initial));
        }
        if let Some(actions) = input.actions {
            builder = builder.bind(("actions", actions));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "role", uid)?.try_into_role()?)
    }

    async fn delete(&self, uid: &str) -> MutiraoResult<()> {
        self.db
            .query("DELETE type::record('role', $id)")
            .bind(("id", uid.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> MutiraoResult<PaginatedResult<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM role GROUP ALL; \
                 SELECT * FROM role ORDER BY name ASC \
                 LIMIT $limit START $offset;",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);
        let rows: Vec<RoleRow> = result.take(1).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: into_roles(rows)?,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn search_by_name(&self, prefix: &str) -> MutiraoResult<Vec<Role>> {
        let (lower, upper) = prefix_range(prefix);

        let mut result = self
            .db
            .query(
                "SELECT * FROM role \
                 WHERE name >= $lower AND name <= $upper \
                 ORDER BY name ASC",
            )
            .bind(("lower", lower))
            .bind(("upper", upper))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_roles(rows)?)
    }

    async fn list_initial(&self) -> MutiraoResult<Vec<Role>> {
        let mut result = self
            .db
            .query("SELECT * FROM role WHERE initial = true ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_roles(rows)?)
    }

    async fn watch(&self) -> MutiraoResult<ChangeStream<Role>> {
        let mut response = self
            .db
            .query("LIVE SELECT meta::id(id) AS record_id, * FROM role")
            .await
            .map_err(DbError::from)?;

        let stream = response
            .stream::<Notification<LiveRoleRow>>(0)
            .map_err(DbError::from)?;

        Ok(live_events(stream, LiveRoleRow::into_parts))
    }
}
