//! Role record persistence.
//!
//! The table holds one row per identity; rows are created by a database
//! trigger when the provider registers the identity, so the store only ever
//! reads and updates.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{UserRecord, UserRole};

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<UserRecord>>;

    /// Update a role, returning the updated record or `None` when the row
    /// does not exist. Never inserts.
    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<Option<UserRecord>>;

    /// Page through role records, admins first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserRecord>>;

    /// Total number of role records, for pagination metadata.
    async fn count(&self) -> Result<i64>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<()>;
}

pub struct PostgresRoleStore {
    pool: PgPool,
}

impl PostgresRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PostgresRoleStore {
    async fn get(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT id, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING id, role",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserRecord>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT id, role FROM users ORDER BY role DESC, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-memory role store for tests.
#[derive(Default)]
pub struct InMemoryRoleStore {
    users: Mutex<HashMap<Uuid, UserRole>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: Uuid, role: UserRole) {
        self.users.lock().unwrap().insert(id, role);
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn get(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let role = self.users.lock().unwrap().get(&id).copied();
        Ok(role.map(|role| UserRecord { id, role }))
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<Option<UserRecord>> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&id) {
            Some(existing) => {
                *existing = role;
                Ok(Some(UserRecord { id, role }))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserRecord>> {
        let mut records: Vec<UserRecord> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .map(|(&id, &role)| UserRecord { id, role })
            .collect();
        // Same ordering as the SQL: admins first, then by id for stability.
        records.sort_by(|a, b| b.role.cmp(&a.role).then(a.id.cmp(&b.id)));
        Ok(records
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.users.lock().unwrap().len() as i64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_role_on_missing_row_returns_none() {
        let store = InMemoryRoleStore::new();
        let result = store.set_role(Uuid::new_v4(), UserRole::Admin).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn list_puts_admins_first_and_respects_paging() {
        let store = InMemoryRoleStore::new();
        for _ in 0..3 {
            store.insert(Uuid::new_v4(), UserRole::User);
        }
        let admin_id = Uuid::new_v4();
        store.insert(admin_id, UserRole::Admin);

        let page = store.list(2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, admin_id);

        let rest = store.list(10, 2).await.unwrap();
        assert_eq!(rest.len(), 2);

        let empty = store.list(10, 10).await.unwrap();
        assert!(empty.is_empty());
    }
}
