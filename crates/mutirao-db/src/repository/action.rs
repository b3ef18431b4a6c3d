//! SurrealDB implementation of [`ActionRepository`].

use chrono::{DateTime, Utc};
use mutirao_core::error::MutiraoResult;
use mutirao_core::models::action::{Action, CreateAction, UpdateAction};
use mutirao_core::repository::ActionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use super::{first_row, id_or_generate};
use crate::error::DbError;

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * FROM type::record('action', $id)";

#[derive(Debug, SurrealValue)]
struct ActionRow {
    record_id: String,
    name: String,
    description: String,
    level: u32,
    parent: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ActionRow {
    fn into_action(self) -> Action {
        Action {
            uid: self.record_id,
            name: self.name,
            description: self.description,
            level: self.level,
            parent: self.parent,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// SurrealDB implementation of the Action repository.
#[derive(Clone)]
pub struct SurrealActionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealActionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ActionRepository for SurrealActionRepository<C> {
    async fn create(&self, input: CreateAction) -> MutiraoResult<Action> {
        if let Some(parent) = &input.parent {
            // Reject dangling prerequisites up front.
            self.get_by_id(parent).await?;
        }

        let id = id_or_generate(None);

        let result = self
            .db
            .query(format!(
                "CREATE type::record('action', $id) SET \
                 uid = $id, name = $name, description = $description, \
                 level = $level, parent = $parent; {SELECT_ONE};"
            ))
            .bind(("id", id.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("level", input.level))
            .bind(("parent", input.parent))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ActionRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "action", &id)?.into_action())
    }

    async fn get_by_id(&self, uid: &str) -> MutiraoResult<Action> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", uid.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActionRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "action", uid)?.into_action())
    }

    async fn update(&self, uid: &str, input: UpdateAction) -> MutiraoResult<Action> {
        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.level.is_some() {
            sets.push("level = $level");
        }
        if input.parent.is_some() {
            sets.push("parent = $parent");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('action', $id) SET {}; {SELECT_ONE};",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", uid.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(level) = input.level {
            builder = builder.bind(("level", level));
        }
        if let Some(parent) = input.parent {
            builder = builder.bind(("parent", parent));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ActionRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "action", uid)?.into_action())
    }

    async fn delete(&self, uid: &str) -> MutiraoResult<()> {
        self.db
            .query("DELETE type::record('action', $id)")
            .bind(("id", uid.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self) -> MutiraoResult<Vec<Action>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM action ORDER BY level ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActionRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(ActionRow::into_action).collect())
    }
}
