//! Integration tests for Role, Action and Avatar repositories using
//! in-memory SurrealDB.

use futures::StreamExt;
use mutirao_core::error::MutiraoError;
use mutirao_core::models::action::{CreateAction, UpdateAction};
use mutirao_core::models::actor::ActorKind;
use mutirao_core::models::avatar::CreateAvatar;
use mutirao_core::models::change::ChangeKind;
use mutirao_core::models::role::{CreateRole, UpdateRole};
use mutirao_core::repository::{
    ActionRepository, AvatarRepository, Pagination, RoleRepository,
};
use mutirao_db::repository::{
    SurrealActionRepository, SurrealAvatarRepository, SurrealRoleRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mutirao_db::run_migrations(&db).await.unwrap();
    db
}

fn role(name: &str, initial: bool) -> CreateRole {
    CreateRole {
        name: name.into(),
        description: format!("{name} role"),
        icon: "star".into(),
        kind: ActorKind::Individual,
        initial,
    }
}

// ---------------------------------------------------------------------------
// Role tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_role() {
    let repo = SurrealRoleRepository::new(setup().await);

    let created = repo
        .create(CreateRole {
            kind: ActorKind::Organization,
            ..role("Coordenação", false)
        })
        .await
        .unwrap();

    assert!(!created.uid.is_empty());
    assert_eq!(created.kind, ActorKind::Organization);
    assert!(created.actions.is_empty());

    let fetched = repo.get_by_id(&created.uid).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_missing_role_is_not_found() {
    let repo = SurrealRoleRepository::new(setup().await);

    let err = repo.get_by_id("missing").await.unwrap_err();
    assert!(matches!(err, MutiraoError::NotFound { .. }));
}

#[tokio::test]
async fn update_and_replace_role() {
    let repo = SurrealRoleRepository::new(setup().await);
    let created = repo.create(role("Cozinha", false)).await.unwrap();

    let updated = repo
        .update(
            &created.uid,
            UpdateRole {
                initial: Some(true),
                actions: Some(vec!["a1".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.initial);
    assert_eq!(updated.actions, vec!["a1".to_string()]);
    assert_eq!(updated.name, "Cozinha");

    let mut replacement = updated.clone();
    replacement.name = "Cozinha comunitária".into();
    replacement.kind = ActorKind::Service;
    let replaced = repo.replace(&created.uid, replacement).await.unwrap();
    assert_eq!(replaced.name, "Cozinha comunitária");
    assert_eq!(replaced.kind, ActorKind::Service);
    assert_eq!(replaced.uid, created.uid);
}

#[tokio::test]
async fn delete_role() {
    let repo = SurrealRoleRepository::new(setup().await);
    let created = repo.create(role("Temporário", false)).await.unwrap();

    repo.delete(&created.uid).await.unwrap();

    let err = repo.get_by_id(&created.uid).await.unwrap_err();
    assert!(matches!(err, MutiraoError::NotFound { .. }));
}

#[tokio::test]
async fn list_and_search_roles() {
    let repo = SurrealRoleRepository::new(setup().await);
    for name in ["Motorista", "Monitor", "Cozinheiro"] {
        repo.create(role(name, false)).await.unwrap();
    }

    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items[0].name, "Cozinheiro");

    let found = repo.search_by_name("Mo").await.unwrap();
    let names: Vec<_> = found.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Monitor", "Motorista"]);
}

#[tokio::test]
async fn list_initial_roles_only() {
    let repo = SurrealRoleRepository::new(setup().await);
    repo.create(role("Acolhimento", true)).await.unwrap();
    repo.create(role("Administração", false)).await.unwrap();
    repo.create(role("Triagem", true)).await.unwrap();

    let initial = repo.list_initial().await.unwrap();
    let names: Vec<_> = initial.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Acolhimento", "Triagem"]);
}

#[tokio::test]
async fn watch_roles_reports_changes() {
    let repo = SurrealRoleRepository::new(setup().await);
    let mut stream = repo.watch().await.unwrap();

    let created = repo.create(role("Logística", false)).await.unwrap();
    let added = stream.next().await.unwrap().unwrap();
    assert_eq!(added.kind, ChangeKind::Added);
    assert_eq!(added.key, created.uid);
    assert_eq!(added.data.unwrap().name, "Logística");
}

// ---------------------------------------------------------------------------
// Action tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_actions_with_parent() {
    let repo = SurrealActionRepository::new(setup().await);

    let assign = repo
        .create(CreateAction {
            name: "Atribuir voluntário a ponto de apoio".into(),
            description: String::new(),
            level: 400,
            parent: None,
        })
        .await
        .unwrap();
    let unassign = repo
        .create(CreateAction {
            name: "Remover voluntário de ponto de apoio".into(),
            description: String::new(),
            level: 600,
            parent: Some(assign.uid.clone()),
        })
        .await
        .unwrap();

    assert_eq!(unassign.parent.as_deref(), Some(assign.uid.as_str()));
    assert!(unassign.is_administrative());

    let listed = repo.list().await.unwrap();
    let levels: Vec<_> = listed.iter().map(|a| a.level).collect();
    assert_eq!(levels, vec![400, 600]);
}

#[tokio::test]
async fn action_with_unknown_parent_is_rejected() {
    let repo = SurrealActionRepository::new(setup().await);

    let err = repo
        .create(CreateAction {
            name: "Órfã".into(),
            description: String::new(),
            level: 2000,
            parent: Some("missing".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MutiraoError::NotFound { .. }));
}

#[tokio::test]
async fn update_and_delete_action() {
    let repo = SurrealActionRepository::new(setup().await);
    let action = repo
        .create(CreateAction {
            name: "Ver relatórios".into(),
            description: String::new(),
            level: 1500,
            parent: None,
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            &action.uid,
            UpdateAction {
                level: Some(500),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.level, 500);
    assert!(updated.is_administrative());

    repo.delete(&action.uid).await.unwrap();
    assert!(repo.list().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Avatar tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn avatar_crud() {
    let repo = SurrealAvatarRepository::new(setup().await);

    let avatar = repo
        .create(CreateAvatar {
            kind: ActorKind::Managed,
            link: "https://img.example/rex.png".into(),
        })
        .await
        .unwrap();

    let fetched = repo.get_by_id(&avatar.uid).await.unwrap();
    assert_eq!(fetched, avatar);
    assert_eq!(repo.list().await.unwrap().len(), 1);

    repo.delete(&avatar.uid).await.unwrap();
    assert!(repo.list().await.unwrap().is_empty());
}
