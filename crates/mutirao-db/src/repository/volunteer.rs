//! SurrealDB implementation of [`VolunteerRepository`].
//!
//! Deleting a volunteer copies the record into `removed_volunteer` and
//! removes the live record in one transaction. Pending-role changes are
//! single `UPDATE` statements using set union/complement, so concurrent
//! requests never lose each other's writes.

use chrono::{DateTime, Utc};
use mutirao_core::error::MutiraoResult;
use mutirao_core::models::volunteer::{CreateVolunteer, UpdateVolunteer, Volunteer, search_name};
use mutirao_core::repository::{
    ChangeStream, PaginatedResult, Pagination, VolunteerRepository, prefix_range,
};
use surrealdb::{Connection, Notification, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;

use super::{CountRow, first_row, id_or_generate, live_events, write_error};
use crate::error::DbError;

const SELECT_ONE: &str = "SELECT * FROM type::record('volunteer', $id)";

/// DB-side row struct for stored volunteers.
#[derive(Debug, SurrealValue)]
struct VolunteerRow {
    uid: Option<String>,
    name: String,
    surname: String,
    name_to_search: String,
    age: Option<u32>,
    email: Option<String>,
    avatar: Option<String>,
    roles: Vec<String>,
    pending_roles: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VolunteerRow {
    fn into_volunteer(self) -> Volunteer {
        Volunteer {
            uid: self.uid.unwrap_or_default(),
            name: self.name,
            surname: self.surname,
            name_to_search: self.name_to_search,
            age: self.age,
            email: self.email,
            avatar: self.avatar,
            roles: self.roles,
            pending_roles: self.pending_roles,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Live-query payload, keyed via `meta::id(id)`. Everything but the key
/// is optional: removal notifications may carry a partial record.
#[derive(Debug, SurrealValue)]
struct LiveVolunteerRow {
    record_id: String,
    uid: Option<String>,
    name: Option<String>,
    surname: Option<String>,
    name_to_search: Option<String>,
    age: Option<u32>,
    email: Option<String>,
    avatar: Option<String>,
    roles: Option<Vec<String>>,
    pending_roles: Option<Vec<String>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl LiveVolunteerRow {
    fn into_parts(self) -> (String, Option<Volunteer>) {
        let volunteer = match (self.name, self.created_at, self.updated_at) {
            (Some(name), Some(created_at), Some(updated_at)) => Some(Volunteer {
                uid: self.uid.unwrap_or_default(),
                name_to_search: self.name_to_search.unwrap_or_else(|| search_name(&name)),
                name,
                surname: self.surname.unwrap_or_default(),
                age: self.age,
                email: self.email,
                avatar: self.avatar,
                roles: self.roles.unwrap_or_default(),
                pending_roles: self.pending_roles.unwrap_or_default(),
                created_at,
                updated_at,
            }),
            _ => None,
        };
        (self.record_id, volunteer)
    }
}

#[derive(Debug, SurrealValue)]
struct PendingRolesRow {
    pending_roles: Vec<String>,
}

/// SurrealDB implementation of the Volunteer repository.
#[derive(Clone)]
pub struct SurrealVolunteerRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealVolunteerRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Run a pending-list update and return the list as it was before.
    async fn update_pending(
        &self,
        uid: &str,
        expr: &str,
        role_id: &str,
    ) -> Result<Vec<String>, DbError> {
        let query = format!(
            "UPDATE type::record('volunteer', $id) SET \
             pending_roles = {expr}, updated_at = time::now() \
             RETURN BEFORE"
        );

        let result = self
            .db
            .query(query)
            .bind(("id", uid.to_string()))
            .bind(("role_id", role_id.to_string()))
            .await?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PendingRolesRow> = result.take(0)?;
        Ok(first_row(rows, "volunteer", uid)?.pending_roles)
    }
}

impl<C: Connection> VolunteerRepository for SurrealVolunteerRepository<C> {
    async fn create(&self, input: CreateVolunteer) -> MutiraoResult<Volunteer> {
        let id = id_or_generate(input.uid);
        let name_to_search = search_name(&input.name);

        let result = self
            .db
            .query(format!(
                "CREATE type::record('volunteer', $id) SET \
                 uid = $id, name = $name, surname = $surname, \
                 name_to_search = $name_to_search, age = $age, \
                 email = $email, avatar = $avatar; {SELECT_ONE};"
            ))
            .bind(("id", id.clone()))
            .bind(("name", input.name))
            .bind(("surname", input.surname))
            .bind(("name_to_search", name_to_search))
            .bind(("age", input.age))
            .bind(("email", input.email))
            .bind(("avatar", input.avatar))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| write_error("volunteer", &id, e))?;

        let rows: Vec<VolunteerRow> = result.take(1).map_err(DbError::from)?;
        debug!(uid = %id, "Volunteer created");
        Ok(first_row(rows, "volunteer", &id)?.into_volunteer())
    }

    async fn get_by_id(&self, uid: &str) -> MutiraoResult<Volunteer> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", uid.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VolunteerRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "volunteer", uid)?.into_volunteer())
    }

    async fn replace(&self, uid: &str, volunteer: Volunteer) -> MutiraoResult<Volunteer> {
        let name_to_search = search_name(&volunteer.name);

        let result = self
            .db
            .query(format!(
                "UPSERT type::record('volunteer', $id) SET \
                 uid = $id, name = $name, surname = $surname, \
                 name_to_search = $name_to_search, age = $age, \
                 email = $email, avatar = $avatar, roles = $roles, \
                 pending_roles = $pending_roles, updated_at = time::now(); \
                 {SELECT_ONE};"
            ))
            .bind(("id", uid.to_string()))
            .bind(("name", volunteer.name))
            .bind(("surname", volunteer.surname))
            .bind(("name_to_search", name_to_search))
            .bind(("age", volunteer.age))
            .bind(("email", volunteer.email))
            .bind(("avatar", volunteer.avatar))
            .bind(("roles", volunteer.roles))
            .bind(("pending_roles", volunteer.pending_roles))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<VolunteerRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "volunteer", uid)?.into_volunteer())
    }

    async fn update(&self, uid: &str, input: UpdateVolunteer) -> MutiraoResult<Volunteer> {
        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
            sets.push("name_to_search = $name_to_search");
        }
        if input.surname.is_some() {
            sets.push("surname = $surname");
        }
        if input.age.is_some() {
            sets.push("age = $age");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.avatar.is_some() {
            sets.push("avatar = $avatar");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('volunteer', $id) SET {}; {SELECT_ONE};",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", uid.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name_to_search", search_name(&name)));
            builder = builder.bind(("name", name));
        }
        if let Some(surname) = input.surname {
            builder = builder.bind(("surname", surname));
        }
        if let Some(age) = input.age {
            builder = builder.bind(("age", age));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(avatar) = input.avatar {
            builder = builder.bind(("avatar", avatar));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<VolunteerRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "volunteer", uid)?.into_volunteer())
    }

    async fn add_pending_role(&self, uid: &str, role_id: &str) -> MutiraoResult<bool> {
        let before = self
            .update_pending(uid, "array::union(pending_roles, [$role_id])", role_id)
            .await?;
        Ok(!before.iter().any(|r| r == role_id))
    }

    async fn remove_pending_role(&self, uid: &str, role_id: &str) -> MutiraoResult<bool> {
        let before = self
            .update_pending(uid, "array::complement(pending_roles, [$role_id])", role_id)
            .await?;
        Ok(before.iter().any(|r| r == role_id))
    }

    async fn delete(&self, uid: &str) -> MutiraoResult<()> {
        // Surface NotFound before opening the transaction.
        self.get_by_id(uid).await?;

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 LET $v = (SELECT * FROM ONLY type::record('volunteer', $id)); \
                 UPSERT type::record('removed_volunteer', $id) SET \
                     uid = $v.uid, name = $v.name, surname = $v.surname, \
                     name_to_search = $v.name_to_search, age = $v.age, \
                     email = $v.email, avatar = $v.avatar, roles = $v.roles, \
                     pending_roles = $v.pending_roles, \
                     created_at = $v.created_at, updated_at = $v.updated_at, \
                     removed_at = time::now(); \
                 DELETE type::record('volunteer', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", uid.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        debug!(uid, "Volunteer moved to archive");
        Ok(())
    }

    async fn get_removed(&self, uid: &str) -> MutiraoResult<Volunteer> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('removed_volunteer', $id)",
            )
            .bind(("id", uid.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VolunteerRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "removed_volunteer", uid)?.into_volunteer())
    }

    async fn list(&self, pagination: Pagination) -> MutiraoResult<PaginatedResult<Volunteer>> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM volunteer GROUP ALL; \
                 SELECT * FROM volunteer \
                 ORDER BY name_to_search ASC \
                 LIMIT $limit START $offset;",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);
        let rows: Vec<VolunteerRow> = result.take(1).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: rows.into_iter().map(VolunteerRow::into_volunteer).collect(),
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn search_by_name(&self, prefix: &str) -> MutiraoResult<Vec<Volunteer>> {
        let (lower, upper) = prefix_range(&search_name(prefix));

        let mut result = self
            .db
            .query(
                "SELECT * FROM volunteer \
                 WHERE name_to_search >= $lower \
                 AND name_to_search <= $upper \
                 ORDER BY name_to_search ASC",
            )
            .bind(("lower", lower))
            .bind(("upper", upper))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VolunteerRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(VolunteerRow::into_volunteer).collect())
    }

    async fn search_by_age(&self, min_age: u32) -> MutiraoResult<Vec<Volunteer>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM volunteer \
                 WHERE age >= $age ORDER BY age ASC",
            )
            .bind(("age", min_age))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VolunteerRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(VolunteerRow::into_volunteer).collect())
    }

    async fn watch(&self) -> MutiraoResult<ChangeStream<Volunteer>> {
        let mut response = self
            .db
            .query("LIVE SELECT meta::id(id) AS record_id, * FROM volunteer")
            .await
            .map_err(DbError::from)?;

        let stream = response
            .stream::<Notification<LiveVolunteerRow>>(0)
            .map_err(DbError::from)?;

        Ok(live_events(stream, LiveVolunteerRow::into_parts))
    }
}
