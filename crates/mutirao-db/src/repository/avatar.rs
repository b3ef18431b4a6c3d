//! SurrealDB implementation of [`AvatarRepository`].

use mutirao_core::error::MutiraoResult;
use mutirao_core::models::avatar::{Avatar, CreateAvatar};
use mutirao_core::repository::AvatarRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use super::{actor_kind, first_row, id_or_generate};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AvatarRow {
    record_id: String,
    kind: i64,
    link: String,
}

impl AvatarRow {
    fn try_into_avatar(self) -> Result<Avatar, DbError> {
        Ok(Avatar {
            uid: self.record_id,
            kind: actor_kind(self.kind)?,
            link: self.link,
        })
    }
}

/// SurrealDB implementation of the Avatar repository.
#[derive(Clone)]
pub struct SurrealAvatarRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAvatarRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AvatarRepository for SurrealAvatarRepository<C> {
    async fn create(&self, input: CreateAvatar) -> MutiraoResult<Avatar> {
        let id = id_or_generate(None);

        self.db
            .query("CREATE type::record('avatar', $id) SET kind = $kind, link = $link")
            .bind(("id", id.clone()))
            .bind(("kind", input.kind.code()))
            .bind(("link", input.link.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(Avatar {
            uid: id,
            kind: input.kind,
            link: input.link,
        })
    }

    async fn get_by_id(&self, uid: &str) -> MutiraoResult<Avatar> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('avatar', $id)",
            )
            .bind(("id", uid.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AvatarRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "avatar", uid)?.try_into_avatar()?)
    }

    async fn delete(&self, uid: &str) -> MutiraoResult<()> {
        self.db
            .query("DELETE type::record('avatar', $id)")
            .bind(("id", uid.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self) -> MutiraoResult<Vec<Avatar>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM avatar")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AvatarRow> = result.take(0).map_err(DbError::from)?;
        let avatars = rows
            .into_iter()
            .map(AvatarRow::try_into_avatar)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(avatars)
    }
}
