//! Store traits.

use crate::error::StoreError;
use crate::models::{AgentGrant, AgentIdentity, UserProfile};
use async_trait::async_trait;

/// User profiles and the agent grants they hold.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert a new profile. Fails with `AlreadyExists` on a duplicate username or email.
    async fn insert_profile(&self, profile: UserProfile) -> Result<(), StoreError>;

    async fn lookup_profile(&self, username: &str) -> Result<Option<UserProfile>, StoreError>;

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Record a new grant for `agent_id` under `username`.
    ///
    /// Fails with `NotFound` if the profile is missing and `AlreadyExists`
    /// if the user already holds a grant for this agent.
    async fn append_agent_grant(
        &self,
        username: &str,
        agent_id: &str,
        permissions: Vec<String>,
    ) -> Result<AgentGrant, StoreError>;

    async fn find_agent_grant(
        &self,
        username: &str,
        agent_id: &str,
    ) -> Result<Option<AgentGrant>, StoreError>;

    /// Replace the permissions of an existing grant. Fails with `NotFound` if absent.
    async fn update_agent_grant_permissions(
        &self,
        username: &str,
        agent_id: &str,
        permissions: Vec<String>,
    ) -> Result<AgentGrant, StoreError>;
}

/// The directory of registered agents.
#[async_trait]
pub trait AgentStore: Send + Sync {
    /// Insert a new agent. Fails with `AlreadyExists` on a duplicate name.
    async fn insert_agent(&self, agent: AgentIdentity) -> Result<(), StoreError>;

    async fn find_agent(&self, agent_name: &str) -> Result<Option<AgentIdentity>, StoreError>;
}
