//! Self-healing watchers against in-memory SurrealDB.

use futures::StreamExt;
use mutirao_core::models::change::ChangeKind;
use mutirao_core::repository::{RoleRepository, VolunteerRepository};
use mutirao_db::repository::{SurrealRoleRepository, SurrealVolunteerRepository};
use mutirao_service::{watch_roles, watch_volunteers};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mutirao_db::run_migrations(&db).await.unwrap();
    db
}

#[tokio::test]
async fn volunteer_without_uid_is_healed() {
    let db = setup().await;
    let repo = SurrealVolunteerRepository::new(db.clone());
    let mut stream = watch_volunteers(&repo).await.unwrap();

    db.query("CREATE volunteer:x SET name = 'Ana', name_to_search = 'ana'")
        .await
        .unwrap()
        .check()
        .unwrap();

    let event = stream.next().await.unwrap().unwrap();
    assert_eq!(event.kind, ChangeKind::Added);
    assert_eq!(event.key, "x");
    assert_eq!(event.data.unwrap().uid, "x");

    let stored = repo.get_by_id("x").await.unwrap();
    assert_eq!(stored.uid, "x");
    assert_eq!(stored.name, "Ana");

    // The back-fill write is observed as a plain modification.
    let follow_up = stream.next().await.unwrap().unwrap();
    assert_eq!(follow_up.kind, ChangeKind::Modified);
    assert_eq!(follow_up.data.unwrap().uid, "x");
}

#[tokio::test]
async fn volunteer_with_uid_passes_through() {
    let db = setup().await;
    let repo = SurrealVolunteerRepository::new(db.clone());
    let mut stream = watch_volunteers(&repo).await.unwrap();

    db.query("CREATE volunteer:y SET uid = 'y', name = 'Bia', name_to_search = 'bia'")
        .await
        .unwrap()
        .check()
        .unwrap();

    let event = stream.next().await.unwrap().unwrap();
    assert_eq!(event.kind, ChangeKind::Added);
    assert_eq!(event.data.unwrap().uid, "y");
}

#[tokio::test]
async fn role_without_uid_is_healed() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    let mut stream = watch_roles(&repo).await.unwrap();

    db.query("CREATE role:r9 SET name = 'Triagem', initial = true")
        .await
        .unwrap()
        .check()
        .unwrap();

    let event = stream.next().await.unwrap().unwrap();
    assert_eq!(event.key, "r9");
    let role = event.data.unwrap();
    assert_eq!(role.uid, "r9");
    assert!(role.initial);

    assert_eq!(repo.get_by_id("r9").await.unwrap().uid, "r9");
}
