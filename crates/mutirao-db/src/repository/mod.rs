//! SurrealDB repository implementations.

mod action;
mod avatar;
mod role;
mod volunteer;

pub use action::SurrealActionRepository;
pub use avatar::SurrealAvatarRepository;
pub use role::SurrealRoleRepository;
pub use volunteer::SurrealVolunteerRepository;

use futures::{Stream, StreamExt, future};
use mutirao_core::error::{MutiraoError, MutiraoResult};
use mutirao_core::models::actor::ActorKind;
use mutirao_core::models::change::{ChangeEvent, ChangeKind};
use mutirao_core::repository::ChangeStream;
use surrealdb::Notification;
use surrealdb::types::Action;
use surrealdb_types::SurrealValue;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Keep a caller-supplied id, or generate one when absent or blank.
fn id_or_generate(uid: Option<String>) -> String {
    uid.filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Classify an error from a write statement, surfacing duplicate keys.
fn write_error(entity: &str, id: &str, err: surrealdb::Error) -> DbError {
    let message = err.to_string();
    if message.contains("already exists") {
        DbError::AlreadyExists {
            entity: entity.into(),
            id: id.into(),
        }
    } else {
        DbError::Query(message)
    }
}

fn first_row<T>(rows: Vec<T>, entity: &str, id: &str) -> Result<T, DbError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| DbError::not_found(entity, id))
}

fn actor_kind(code: i64) -> Result<ActorKind, DbError> {
    ActorKind::from_code(code).ok_or_else(|| DbError::Decode(format!("unknown actor kind: {code}")))
}

/// Classify a live-query action. Record changes map to a [`ChangeKind`],
/// a failing query surfaces as an error, and the notification sent when
/// the query itself is killed yields `None`.
fn change_kind(action: Action) -> Option<MutiraoResult<ChangeKind>> {
    match action {
        Action::Create => Some(Ok(ChangeKind::Added)),
        Action::Update => Some(Ok(ChangeKind::Modified)),
        Action::Delete => Some(Ok(ChangeKind::Removed)),
        Action::Error => Some(Err(MutiraoError::StreamClosed(
            "live query reported an error".into(),
        ))),
        _ => None,
    }
}

/// Turn a live-query notification stream into domain change events.
///
/// `split` separates a row into its storage key and, when the payload
/// is complete enough, the decoded record.
fn live_events<S, R, T>(stream: S, split: fn(R) -> (String, Option<T>)) -> ChangeStream<T>
where
    S: Stream<Item = Result<Notification<R>, surrealdb::Error>> + Send + 'static,
    R: Send + 'static,
    T: Send + 'static,
{
    stream
        .filter_map(move |item| {
            future::ready(match item {
                Ok(notification) => change_kind(notification.action).map(|kind| {
                    let kind = kind?;
                    let (key, data) = split(notification.data);
                    Ok(ChangeEvent {
                        kind,
                        key,
                        exists: kind != ChangeKind::Removed,
                        data,
                    })
                }),
                Err(e) => Some(Err(DbError::from(e).into())),
            })
        })
        .boxed()
}
