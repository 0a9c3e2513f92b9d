//! SQLite-backed store.

use crate::error::StoreError;
use crate::models::{AgentGrant, AgentIdentity, UserProfile};
use crate::storage::{AgentStore, ProfileStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{fs, path::Path};
use tracing::debug;

type ProfileRow = (String, String, String, String, DateTime<Utc>, DateTime<Utc>);
type AgentRow = (String, String, String, DateTime<Utc>, DateTime<Utc>);

/// Persistent store over a SQLite database.
///
/// The schema is created by the embedded migrations on open.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path` and run migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        debug!(path = %path.display(), "Opened SQLite store");
        Self::from_pool(pool).await
    }

    /// A private in-memory database, mainly for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        // Every connection to `:memory:` is a separate database, so keep one.
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, running migrations against it.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load_grants(&self, username: &str) -> Result<Vec<AgentGrant>, StoreError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT agent_id, permissions FROM agent_grants WHERE username = ? ORDER BY rowid",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(agent_id, permissions)| -> Result<AgentGrant, StoreError> {
                Ok(AgentGrant::new(agent_id, serde_json::from_str(&permissions)?))
            })
            .collect()
    }

    async fn hydrate(&self, row: Option<ProfileRow>) -> Result<Option<UserProfile>, StoreError> {
        let Some((username, email, name, password, created_at, updated_at)) = row else {
            return Ok(None);
        };
        let agents = self.load_grants(&username).await?;
        Ok(Some(UserProfile {
            username,
            email,
            name,
            password,
            agents,
            created_at,
            updated_at,
        }))
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }
    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Map an insert error, reporting a unique-constraint hit as `AlreadyExists`.
fn insert_error(err: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::AlreadyExists(what())
    } else {
        err.into()
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn insert_profile(&self, profile: UserProfile) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let username_taken: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM profiles WHERE username = ?")
                .bind(&profile.username)
                .fetch_optional(&mut *tx)
                .await?;
        if username_taken.is_some() {
            return Err(StoreError::AlreadyExists(format!(
                "username {}",
                profile.username
            )));
        }

        let email_taken: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM profiles WHERE email = ?")
            .bind(&profile.email)
            .fetch_optional(&mut *tx)
            .await?;
        if email_taken.is_some() {
            return Err(StoreError::AlreadyExists(format!("email {}", profile.email)));
        }

        sqlx::query(
            "INSERT INTO profiles (username, email, name, password, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.password)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_error(e, || format!("username {}", profile.username)))?;

        for grant in &profile.agents {
            sqlx::query(
                "INSERT INTO agent_grants (username, agent_id, permissions) VALUES (?, ?, ?)",
            )
            .bind(&profile.username)
            .bind(&grant.agent_id)
            .bind(serde_json::to_string(&grant.permissions)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn lookup_profile(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT username, email, name, password, created_at, updated_at \
             FROM profiles WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate(row).await
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT username, email, name, password, created_at, updated_at \
             FROM profiles WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate(row).await
    }

    async fn append_agent_grant(
        &self,
        username: &str,
        agent_id: &str,
        permissions: Vec<String>,
    ) -> Result<AgentGrant, StoreError> {
        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query("UPDATE profiles SET updated_at = ? WHERE username = ?")
            .bind(Utc::now())
            .bind(username)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("profile {username}")));
        }

        let inserted = sqlx::query(
            "INSERT INTO agent_grants (username, agent_id, permissions) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(agent_id)
        .bind(serde_json::to_string(&permissions)?)
        .execute(&mut *tx)
        .await;
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::AlreadyExists(format!("grant for agent {agent_id}")));
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;
        Ok(AgentGrant::new(agent_id, permissions))
    }

    async fn find_agent_grant(
        &self,
        username: &str,
        agent_id: &str,
    ) -> Result<Option<AgentGrant>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT permissions FROM agent_grants WHERE username = ? AND agent_id = ?",
        )
        .bind(username)
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((permissions,)) => Ok(Some(AgentGrant::new(
                agent_id,
                serde_json::from_str(&permissions)?,
            ))),
            None => Ok(None),
        }
    }

    async fn update_agent_grant_permissions(
        &self,
        username: &str,
        agent_id: &str,
        permissions: Vec<String>,
    ) -> Result<AgentGrant, StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE agent_grants SET permissions = ? WHERE username = ? AND agent_id = ?",
        )
        .bind(serde_json::to_string(&permissions)?)
        .bind(username)
        .bind(agent_id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("grant for agent {agent_id}")));
        }

        sqlx::query("UPDATE profiles SET updated_at = ? WHERE username = ?")
            .bind(Utc::now())
            .bind(username)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(AgentGrant::new(agent_id, permissions))
    }
}

#[async_trait]
impl AgentStore for SqliteStore {
    async fn insert_agent(&self, agent: AgentIdentity) -> Result<(), StoreError> {
        let inserted = sqlx::query(
            "INSERT INTO agents (agent_name, agent_uid, password, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&agent.agent_name)
        .bind(&agent.agent_uid)
        .bind(&agent.password)
        .bind(agent.created_at)
        .bind(agent.updated_at)
        .execute(&self.pool)
        .await;

        inserted
            .map(|_| ())
            .map_err(|e| insert_error(e, || format!("agent {}", agent.agent_name)))
    }

    async fn find_agent(&self, agent_name: &str) -> Result<Option<AgentIdentity>, StoreError> {
        let row: Option<AgentRow> = sqlx::query_as(
            "SELECT agent_name, agent_uid, password, created_at, updated_at \
             FROM agents WHERE agent_name = ?",
        )
        .bind(agent_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(agent_name, agent_uid, password, created_at, updated_at)| AgentIdentity {
                agent_name,
                password,
                agent_uid,
                created_at,
                updated_at,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_profile_insert_conflict_maps_to_already_exists() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .insert_profile(UserProfile::new("alice", "Alice", "alice@example.com", "h"))
            .await
            .unwrap();

        // Bypasses the pre-insert lookups, as a concurrent registration would.
        let err = sqlx::query(
            "INSERT INTO profiles (username, email, name, password, created_at, updated_at) \
             VALUES ('alice', 'other@example.com', 'A', 'h', 0, 0)",
        )
        .execute(store.pool())
        .await
        .unwrap_err();

        assert!(matches!(
            insert_error(err, || "username alice".into()),
            StoreError::AlreadyExists(what) if what == "username alice"
        ));
    }

    #[tokio::test]
    async fn test_other_insert_errors_stay_database_errors() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = sqlx::query("INSERT INTO missing_table VALUES (1)")
            .execute(store.pool())
            .await
            .unwrap_err();

        assert!(matches!(
            insert_error(err, || "unused".into()),
            StoreError::Database(_)
        ));
    }
}
