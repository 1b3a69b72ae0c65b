//! SeaORM-backed storage.
//!
//! Provides database persistence for organizations, users and memberships
//! using SeaORM.
//!
//! # Database Schema
//!
//! [`SeaOrmStore::create_schema`] creates these tables if they do not exist.
//! In production you will usually manage them with migrations instead:
//!
//! ```sql
//! CREATE TABLE organizations (
//!     id VARCHAR(36) PRIMARY KEY,
//!     name VARCHAR(255) UNIQUE NOT NULL,
//!     created_by VARCHAR(36) NOT NULL,
//!     created_at BIGINT NOT NULL,
//!     updated_at BIGINT NOT NULL
//! );
//!
//! CREATE TABLE users (
//!     id VARCHAR(36) PRIMARY KEY,
//!     username VARCHAR(255) NOT NULL,
//!     email VARCHAR(255) UNIQUE NOT NULL,
//!     external_id VARCHAR(255) UNIQUE,
//!     created_at BIGINT NOT NULL,
//!     updated_at BIGINT NOT NULL
//! );
//!
//! CREATE TABLE organization_members (
//!     org_id VARCHAR(36) NOT NULL,
//!     user_id VARCHAR(36) NOT NULL,
//!     role VARCHAR(20) NOT NULL,
//!     created_at BIGINT NOT NULL,
//!     PRIMARY KEY (org_id, user_id)
//! );
//! ```

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Schema, Set, TransactionTrait, sea_query::Expr,
};
use std::collections::HashMap;

use super::{MembershipStore, OrganizationStore, UserStore};
use crate::database::{DatabaseConfig, SeaOrmPool};
use crate::error::{StoreError, StoreResult};
use crate::types::{MemberWithUser, Membership, NewUser, Organization, Role, User};
use crate::utils::{current_timestamp, new_id};

mod entity {
    pub mod organization {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "organizations")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: String,
            #[sea_orm(unique)]
            pub name: String,
            pub created_by: String,
            pub created_at: i64,
            pub updated_at: i64,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    pub mod user {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "users")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: String,
            pub username: String,
            #[sea_orm(unique)]
            pub email: String,
            #[sea_orm(unique)]
            pub external_id: Option<String>,
            pub created_at: i64,
            pub updated_at: i64,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    pub mod membership {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "organization_members")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub org_id: String,
            #[sea_orm(primary_key, auto_increment = false)]
            pub user_id: String,
            pub role: String,
            pub created_at: i64,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }
}

use entity::{membership, organization, user};

/// Convert i64 to u64 safely (negative values become 0).
#[inline]
fn i64_to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Convert u64 to i64 safely (values > i64::MAX become i64::MAX).
#[inline]
fn u64_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn model_to_organization(model: organization::Model) -> Organization {
    Organization {
        id: model.id,
        name: model.name,
        created_by: model.created_by,
        created_at: i64_to_u64(model.created_at),
        updated_at: i64_to_u64(model.updated_at),
    }
}

fn model_to_user(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        external_id: model.external_id,
        created_at: i64_to_u64(model.created_at),
        updated_at: i64_to_u64(model.updated_at),
    }
}

/// Roles are written by this store only, so an unknown value means the row
/// was edited out of band.
fn model_to_membership(model: membership::Model) -> StoreResult<Membership> {
    let role = model.role.parse::<Role>().map_err(|e| {
        StoreError::backend(format!(
            "corrupt membership row ({}, {}): {}",
            model.org_id, model.user_id, e
        ))
    })?;

    Ok(Membership {
        org_id: model.org_id,
        user_id: model.user_id,
        role,
        created_at: i64_to_u64(model.created_at),
    })
}

fn membership_active_model(m: &Membership) -> membership::ActiveModel {
    membership::ActiveModel {
        org_id: Set(m.org_id.clone()),
        user_id: Set(m.user_id.clone()),
        role: Set(m.role.as_str().to_string()),
        created_at: Set(u64_to_i64(m.created_at)),
    }
}

/// SeaORM-backed store implementing all storage traits.
#[derive(Clone, Debug)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    /// Create a new SeaORM store.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connect with pool settings from `config`.
    ///
    /// Creates the tables first when `config.create_schema` is set.
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = SeaOrmPool::from_config(config).await?;
        let store = Self::new(pool.inner().clone());
        if config.create_schema {
            store.create_schema().await?;
        }
        Ok(store)
    }

    /// Get a reference to the underlying database connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Create the tables used by this store if they do not exist.
    pub async fn create_schema(&self) -> StoreResult<()> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);

        let mut organizations = schema.create_table_from_entity(organization::Entity);
        organizations.if_not_exists();
        let mut users = schema.create_table_from_entity(user::Entity);
        users.if_not_exists();
        let mut members = schema.create_table_from_entity(membership::Entity);
        members.if_not_exists();

        for stmt in [&organizations, &users, &members] {
            self.db.execute(backend.build(stmt)).await?;
        }

        tracing::info!("organization schema ready");
        Ok(())
    }
}

#[async_trait]
impl OrganizationStore for SeaOrmStore {
    async fn create_with_admin(&self, name: &str, created_by: &str) -> StoreResult<Organization> {
        let now = current_timestamp();
        let org = Organization {
            id: new_id(),
            name: name.to_string(),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        };

        tracing::debug!(
            org_id = %org.id,
            user_id = %created_by,
            "creating organization and admin atomically"
        );

        // Dropping the transaction without commit rolls it back.
        let txn = self.db.begin().await?;

        organization::Entity::insert(organization::ActiveModel {
            id: Set(org.id.clone()),
            name: Set(org.name.clone()),
            created_by: Set(org.created_by.clone()),
            created_at: Set(u64_to_i64(now)),
            updated_at: Set(u64_to_i64(now)),
        })
        .exec_without_returning(&txn)
        .await?;

        membership::Entity::insert(membership_active_model(&Membership {
            org_id: org.id.clone(),
            user_id: created_by.to_string(),
            role: Role::Admin,
            created_at: now,
        }))
        .exec_without_returning(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(
            org_id = %org.id,
            admin_id = %created_by,
            "organization and admin created atomically"
        );

        Ok(org)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Organization>> {
        tracing::debug!(org_id = %id, "finding organization by id");

        let org = organization::Entity::find_by_id(id).one(&self.db).await?;
        Ok(org.map(model_to_organization))
    }
}

#[async_trait]
impl MembershipStore for SeaOrmStore {
    async fn get_membership(&self, org_id: &str, user_id: &str) -> StoreResult<Option<Membership>> {
        tracing::debug!(org_id = %org_id, user_id = %user_id, "getting membership");

        membership::Entity::find()
            .filter(membership::Column::OrgId.eq(org_id))
            .filter(membership::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .map(model_to_membership)
            .transpose()
    }

    async fn insert_membership(&self, m: &Membership) -> StoreResult<()> {
        tracing::debug!(
            org_id = %m.org_id,
            user_id = %m.user_id,
            role = %m.role,
            "inserting membership"
        );

        membership::Entity::insert(membership_active_model(m))
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn update_role(&self, org_id: &str, user_id: &str, role: Role) -> StoreResult<()> {
        tracing::debug!(org_id = %org_id, user_id = %user_id, role = %role, "updating role");

        let result = membership::Entity::update_many()
            .col_expr(membership::Column::Role, Expr::value(role.as_str()))
            .filter(membership::Column::OrgId.eq(org_id))
            .filter(membership::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn remove_member(&self, org_id: &str, user_id: &str) -> StoreResult<bool> {
        tracing::debug!(org_id = %org_id, user_id = %user_id, "removing member");

        let result = membership::Entity::delete_many()
            .filter(membership::Column::OrgId.eq(org_id))
            .filter(membership::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn list_members_with_users(&self, org_id: &str) -> StoreResult<Vec<MemberWithUser>> {
        tracing::debug!(org_id = %org_id, "listing members");

        let members = membership::Entity::find()
            .filter(membership::Column::OrgId.eq(org_id))
            .order_by_asc(membership::Column::CreatedAt)
            .order_by_asc(membership::Column::UserId)
            .all(&self.db)
            .await?;

        if members.is_empty() {
            return Ok(vec![]);
        }

        let user_ids: Vec<String> = members.iter().map(|m| m.user_id.clone()).collect();
        let users: HashMap<String, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        members
            .into_iter()
            .map(|model| -> StoreResult<MemberWithUser> {
                let user = users.get(&model.user_id);
                Ok(MemberWithUser {
                    username: user.map(|u| u.username.clone()).unwrap_or_default(),
                    email: user.map(|u| u.email.clone()).unwrap_or_default(),
                    membership: model_to_membership(model)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl UserStore for SeaOrmStore {
    async fn find_or_create_by_external_id(&self, new_user: &NewUser) -> StoreResult<User> {
        let txn = self.db.begin().await?;

        if let Some(existing) = user::Entity::find()
            .filter(user::Column::ExternalId.eq(new_user.external_id.as_str()))
            .one(&txn)
            .await?
        {
            txn.commit().await?;
            return Ok(model_to_user(existing));
        }

        let now = current_timestamp();

        if let Some(by_email) = user::Entity::find()
            .filter(user::Column::Email.eq(new_user.email.as_str()))
            .one(&txn)
            .await?
        {
            tracing::info!(user_id = %by_email.id, "linking external login to existing user");

            let mut active: user::ActiveModel = by_email.into();
            active.external_id = Set(Some(new_user.external_id.clone()));
            active.updated_at = Set(u64_to_i64(now));
            let linked = active.update(&txn).await?;

            txn.commit().await?;
            return Ok(model_to_user(linked));
        }

        let user = User {
            id: new_id(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            external_id: Some(new_user.external_id.clone()),
            created_at: now,
            updated_at: now,
        };

        user::Entity::insert(user::ActiveModel {
            id: Set(user.id.clone()),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            external_id: Set(user.external_id.clone()),
            created_at: Set(u64_to_i64(now)),
            updated_at: Set(u64_to_i64(now)),
        })
        .exec_without_returning(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(user_id = %user.id, "created user for external login");
        Ok(user)
    }
}
