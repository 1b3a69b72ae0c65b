//! Membership operations against the SeaORM store.
//!
//! Uses an in-memory SQLite database with a single connection, so every
//! test gets a fresh schema.

use orgauth::database::sea_orm::{ConnectionTrait, Statement};
use orgauth::storage::{MembershipStore, OrganizationStore, SeaOrmStore, UserStore};
use orgauth::{
    AccessOutcome, AccessService, AuthzError, DatabaseConfig, Identity, IdentityResolver,
    JwtTokenVerifier, MembershipManager, NewUser, Role, VerifiedCredential,
};

struct Fixture {
    store: SeaOrmStore,
    manager: MembershipManager<SeaOrmStore>,
    access: AccessService<SeaOrmStore>,
    u1: Identity,
    u2: Identity,
    u3: Identity,
}

impl Fixture {
    async fn new() -> Self {
        let mut config = DatabaseConfig::new("sqlite::memory:");
        config.max_connections = 1;
        config.min_connections = 1;
        config.create_schema = true;

        let store = SeaOrmStore::connect(&config).await.unwrap();

        let u1 = user(&store, "u1").await;
        let u2 = user(&store, "u2").await;
        let u3 = user(&store, "u3").await;

        Self {
            manager: MembershipManager::new(store.clone()),
            access: AccessService::new(store.clone()),
            store,
            u1,
            u2,
            u3,
        }
    }

    async fn sorted_roster(&self, acting: &Identity, org_id: &str) -> Vec<(String, Role)> {
        let mut roster: Vec<(String, Role)> = self
            .manager
            .list_members(acting, org_id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| (m.username, m.membership.role))
            .collect();
        roster.sort_by(|a, b| a.0.cmp(&b.0));
        roster
    }
}

async fn count(store: &SeaOrmStore, table: &str) -> i64 {
    let db = store.connection();
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

async fn user(store: &SeaOrmStore, name: &str) -> Identity {
    let user = store
        .find_or_create_by_external_id(&NewUser {
            external_id: format!("sub-{name}"),
            email: format!("{name}@example.com"),
            username: name.to_string(),
        })
        .await
        .unwrap();
    Identity::new(user.id)
}

#[tokio::test]
async fn full_lifecycle() {
    let fx = Fixture::new().await;

    let org = fx.manager.create_organization("Acme", &fx.u1).await.unwrap();
    assert_eq!(
        fx.access.is_admin(&org.id, fx.u1.user_id()).await,
        AccessOutcome::Authorized(Role::Admin)
    );

    fx.manager
        .add_member(&fx.u1, &org.id, fx.u2.user_id(), Role::Member)
        .await
        .unwrap();
    assert_eq!(
        fx.sorted_roster(&fx.u2, &org.id).await,
        vec![("u1".to_string(), Role::Admin), ("u2".to_string(), Role::Member)]
    );

    let err = fx
        .manager
        .add_member(&fx.u2, &org.id, fx.u3.user_id(), Role::Member)
        .await
        .unwrap_err();
    assert_eq!(err, AuthzError::Unauthorized);

    fx.manager
        .update_role(&fx.u1, &org.id, fx.u2.user_id(), Role::Admin)
        .await
        .unwrap();
    fx.manager
        .remove_member(&fx.u1, &org.id, fx.u1.user_id())
        .await
        .unwrap();

    assert_eq!(
        fx.sorted_roster(&fx.u2, &org.id).await,
        vec![("u2".to_string(), Role::Admin)]
    );
    assert_eq!(
        fx.access.is_member(&org.id, fx.u1.user_id()).await,
        AccessOutcome::NotAMember
    );
}

#[tokio::test]
async fn duplicate_membership_and_organization() {
    let fx = Fixture::new().await;
    let org = fx.manager.create_organization("Acme", &fx.u1).await.unwrap();

    fx.manager
        .add_member(&fx.u1, &org.id, fx.u2.user_id(), Role::Member)
        .await
        .unwrap();
    let err = fx
        .manager
        .add_member(&fx.u1, &org.id, fx.u2.user_id(), Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(err, AuthzError::AlreadyMember);

    let row = fx
        .store
        .get_membership(&org.id, fx.u2.user_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.role, Role::Member);

    let err = fx.manager.create_organization("Acme", &fx.u3).await.unwrap_err();
    assert_eq!(err, AuthzError::DuplicateOrganization);
    assert_eq!(
        fx.access.is_member(&org.id, fx.u3.user_id()).await,
        AccessOutcome::NotAMember
    );
}

#[tokio::test]
async fn update_is_not_upsert_and_remove_is_idempotent() {
    let fx = Fixture::new().await;
    let org = fx.manager.create_organization("Acme", &fx.u1).await.unwrap();

    let err = fx
        .manager
        .update_role(&fx.u1, &org.id, fx.u3.user_id(), Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(err, AuthzError::NotAMember);
    assert_eq!(
        fx.store.get_membership(&org.id, fx.u3.user_id()).await.unwrap(),
        None
    );

    fx.manager
        .remove_member(&fx.u1, &org.id, fx.u3.user_id())
        .await
        .unwrap();
    fx.manager
        .remove_member(&fx.u1, &org.id, fx.u3.user_id())
        .await
        .unwrap();
    assert_eq!(fx.sorted_roster(&fx.u1, &org.id).await.len(), 1);
}

#[tokio::test]
async fn organization_lookup_is_member_gated() {
    let fx = Fixture::new().await;
    let org = fx.manager.create_organization("  Acme  ", &fx.u1).await.unwrap();
    assert_eq!(org.name, "Acme");

    let found = fx.manager.get_organization(&fx.u1, &org.id).await.unwrap();
    assert_eq!(found, org);
    assert_eq!(
        fx.store
            .find_by_id(&org.id)
            .await
            .unwrap()
            .map(|o| o.created_by),
        Some(fx.u1.user_id().to_string())
    );

    let err = fx.manager.get_organization(&fx.u3, &org.id).await.unwrap_err();
    assert_eq!(err, AuthzError::NotAMember);
}

#[tokio::test]
async fn concurrent_creates_of_same_name_yield_one_organization() {
    let fx = Fixture::new().await;

    let (a, b) = tokio::join!(
        fx.manager.create_organization("Acme", &fx.u1),
        fx.manager.create_organization("Acme", &fx.u2),
    );

    let (org, err) = match (a, b) {
        (Ok(org), Err(err)) | (Err(err), Ok(org)) => (org, err),
        other => panic!("expected exactly one success, got {other:?}"),
    };
    assert_eq!(err, AuthzError::DuplicateOrganization);
    assert_eq!(count(&fx.store, "organizations").await, 1);
    assert_eq!(count(&fx.store, "organization_members").await, 1);

    let creator = Identity::new(org.created_by.clone());
    assert_eq!(
        fx.access.is_admin(&org.id, creator.user_id()).await,
        AccessOutcome::Authorized(Role::Admin)
    );
}

#[tokio::test]
async fn concurrent_first_logins_share_one_user() {
    let fx = Fixture::new().await;
    let resolver = IdentityResolver::new(
        fx.store.clone(),
        JwtTokenVerifier::from_secret(b"unused"),
        "client-1",
    );
    let credential = VerifiedCredential {
        subject: "sub-new".to_string(),
        email: "newcomer@example.com".to_string(),
        name: None,
    };

    let (a, b) = tokio::join!(
        resolver.resolve_credential(&credential),
        resolver.resolve_credential(&credential),
    );

    assert_eq!(a.unwrap(), b.unwrap());
    // u1, u2, u3 plus the newcomer.
    assert_eq!(count(&fx.store, "users").await, 4);
}
