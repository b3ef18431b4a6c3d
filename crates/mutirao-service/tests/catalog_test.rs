//! Granting and revoking actions through the role catalog.

use mutirao_core::error::MutiraoError;
use mutirao_core::models::action::{Action, CreateAction};
use mutirao_core::models::actor::ActorKind;
use mutirao_core::models::role::{CreateRole, Role};
use mutirao_core::repository::{ActionRepository, RoleRepository};
use mutirao_db::repository::{SurrealActionRepository, SurrealRoleRepository};
use mutirao_service::RoleCatalog;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

struct Fixture {
    catalog: RoleCatalog<SurrealRoleRepository<Db>, SurrealActionRepository<Db>>,
    actions: SurrealActionRepository<Db>,
    role: Role,
    parent: Action,
    child: Action,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mutirao_db::run_migrations(&db).await.unwrap();

    let roles = SurrealRoleRepository::new(db.clone());
    let actions = SurrealActionRepository::new(db);

    let role = roles
        .create(CreateRole {
            name: "Coordenação".into(),
            description: String::new(),
            icon: String::new(),
            kind: ActorKind::Individual,
            initial: false,
        })
        .await
        .unwrap();
    let parent = actions
        .create(CreateAction {
            name: "Atribuir voluntário".into(),
            description: String::new(),
            level: 400,
            parent: None,
        })
        .await
        .unwrap();
    let child = actions
        .create(CreateAction {
            name: "Remover voluntário".into(),
            description: String::new(),
            level: 600,
            parent: Some(parent.uid.clone()),
        })
        .await
        .unwrap();

    Fixture {
        catalog: RoleCatalog::new(roles, actions.clone()),
        actions,
        role,
        parent,
        child,
    }
}

#[tokio::test]
async fn child_requires_parent() {
    let f = setup().await;

    let err = f
        .catalog
        .grant_action(&f.role.uid, &f.child.uid)
        .await
        .unwrap_err();
    assert!(matches!(err, MutiraoError::Validation { .. }), "got {err:?}");

    f.catalog.grant_action(&f.role.uid, &f.parent.uid).await.unwrap();
    let role = f.catalog.grant_action(&f.role.uid, &f.child.uid).await.unwrap();
    assert_eq!(role.actions, vec![f.parent.uid.clone(), f.child.uid.clone()]);
}

#[tokio::test]
async fn granting_twice_is_a_no_op() {
    let f = setup().await;

    f.catalog.grant_action(&f.role.uid, &f.parent.uid).await.unwrap();
    let role = f.catalog.grant_action(&f.role.uid, &f.parent.uid).await.unwrap();
    assert_eq!(role.actions, vec![f.parent.uid.clone()]);
}

#[tokio::test]
async fn parent_cannot_be_revoked_while_child_is_granted() {
    let f = setup().await;
    f.catalog.grant_action(&f.role.uid, &f.parent.uid).await.unwrap();
    f.catalog.grant_action(&f.role.uid, &f.child.uid).await.unwrap();

    let err = f
        .catalog
        .revoke_action(&f.role.uid, &f.parent.uid)
        .await
        .unwrap_err();
    assert!(matches!(err, MutiraoError::Validation { .. }));

    f.catalog.revoke_action(&f.role.uid, &f.child.uid).await.unwrap();
    let role = f.catalog.revoke_action(&f.role.uid, &f.parent.uid).await.unwrap();
    assert!(role.actions.is_empty());
}

#[tokio::test]
async fn unknown_action_is_not_found() {
    let f = setup().await;

    let err = f
        .catalog
        .grant_action(&f.role.uid, "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, MutiraoError::NotFound { .. }));
}

#[tokio::test]
async fn revoke_ignores_granted_actions_that_were_deleted() {
    let f = setup().await;
    let other = f
        .actions
        .create(CreateAction {
            name: "Ver relatórios".into(),
            description: String::new(),
            level: 1500,
            parent: None,
        })
        .await
        .unwrap();
    f.catalog.grant_action(&f.role.uid, &f.parent.uid).await.unwrap();
    f.catalog.grant_action(&f.role.uid, &other.uid).await.unwrap();

    f.actions.delete(&other.uid).await.unwrap();

    let role = f.catalog.revoke_action(&f.role.uid, &f.parent.uid).await.unwrap();
    assert_eq!(role.actions, vec![other.uid]);
}
