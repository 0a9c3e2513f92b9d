//! In-memory store.

use crate::error::StoreError;
use crate::models::{AgentGrant, AgentIdentity, UserProfile};
use crate::storage::{AgentStore, ProfileStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store backed by maps. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Profiles keyed by username.
    profiles: RwLock<HashMap<String, UserProfile>>,
    /// Agents keyed by agent name.
    agents: RwLock<HashMap<String, AgentIdentity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn insert_profile(&self, profile: UserProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().await;

        if profiles.contains_key(&profile.username) {
            return Err(StoreError::AlreadyExists(format!(
                "username {}",
                profile.username
            )));
        }
        if profiles.values().any(|p| p.email == profile.email) {
            return Err(StoreError::AlreadyExists(format!("email {}", profile.email)));
        }

        profiles.insert(profile.username.clone(), profile);
        Ok(())
    }

    async fn lookup_profile(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.profiles.read().await.get(username).cloned())
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn append_agent_grant(
        &self,
        username: &str,
        agent_id: &str,
        permissions: Vec<String>,
    ) -> Result<AgentGrant, StoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound(format!("profile {username}")))?;

        if profile.grant(agent_id).is_some() {
            return Err(StoreError::AlreadyExists(format!("grant for agent {agent_id}")));
        }

        let grant = AgentGrant::new(agent_id, permissions);
        profile.agents.push(grant.clone());
        profile.updated_at = Utc::now();
        Ok(grant)
    }

    async fn find_agent_grant(
        &self,
        username: &str,
        agent_id: &str,
    ) -> Result<Option<AgentGrant>, StoreError> {
        Ok(self
            .profiles
            .read()
            .await
            .get(username)
            .and_then(|p| p.grant(agent_id))
            .cloned())
    }

    async fn update_agent_grant_permissions(
        &self,
        username: &str,
        agent_id: &str,
        permissions: Vec<String>,
    ) -> Result<AgentGrant, StoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound(format!("profile {username}")))?;

        let grant = profile
            .grant_mut(agent_id)
            .ok_or_else(|| StoreError::NotFound(format!("grant for agent {agent_id}")))?;
        grant.permissions = permissions;
        let updated = grant.clone();

        profile.updated_at = Utc::now();
        Ok(updated)
    }
}

#[async_trait]
impl AgentStore for MemoryStore {
    async fn insert_agent(&self, agent: AgentIdentity) -> Result<(), StoreError> {
        let mut agents = self.agents.write().await;
        if agents.contains_key(&agent.agent_name) {
            return Err(StoreError::AlreadyExists(format!("agent {}", agent.agent_name)));
        }
        agents.insert(agent.agent_name.clone(), agent);
        Ok(())
    }

    async fn find_agent(&self, agent_name: &str) -> Result<Option<AgentIdentity>, StoreError> {
        Ok(self.agents.read().await.get(agent_name).cloned())
    }
}
