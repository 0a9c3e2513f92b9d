//! Stored records.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Permissions a user has granted to one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentGrant {
    pub agent_id: String,
    pub permissions: Vec<String>,
}

impl AgentGrant {
    pub fn new(agent_id: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            permissions,
        }
    }
}

/// A registered user and the grants they have made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub name: String,
    /// Stored credential hash, never the plaintext.
    pub password: String,
    #[serde(default)]
    pub agents: Vec<AgentGrant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A new profile with no grants, timestamped now.
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            username: username.into(),
            email: email.into(),
            name: name.into(),
            password: password.into(),
            agents: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The grant held for `agent_id`, if any.
    pub fn grant(&self, agent_id: &str) -> Option<&AgentGrant> {
        self.agents.iter().find(|g| g.agent_id == agent_id)
    }

    pub(crate) fn grant_mut(&mut self, agent_id: &str) -> Option<&mut AgentGrant> {
        self.agents.iter_mut().find(|g| g.agent_id == agent_id)
    }
}

/// A registered agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentIdentity {
    pub agent_name: String,
    /// Stored credential hash, never the plaintext.
    pub password: String,
    /// Random 32-hex-character identifier assigned at registration.
    pub agent_uid: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentIdentity {
    /// A new agent with a freshly generated uid, timestamped now.
    pub fn new(agent_name: impl Into<String>, password: impl Into<String>) -> Self {
        let mut uid = [0u8; 16];
        rand::rng().fill_bytes(&mut uid);

        let now = Utc::now();
        Self {
            agent_name: agent_name.into(),
            password: password.into(),
            agent_uid: hex::encode(uid),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grant_serializes_camel_case() {
        let grant = AgentGrant::new("agent-1", vec!["READ".into()]);
        assert_eq!(
            serde_json::to_value(&grant).unwrap(),
            json!({"agentId": "agent-1", "permissions": ["READ"]})
        );
    }

    #[test]
    fn test_agent_uid_is_hex32() {
        let a = AgentIdentity::new("crawler", "hash");
        let b = AgentIdentity::new("crawler", "hash");
        assert_eq!(a.agent_uid.len(), 32);
        assert!(a.agent_uid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.agent_uid, b.agent_uid);
    }

    #[test]
    fn test_profile_grant_lookup() {
        let mut profile = UserProfile::new("alice", "Alice", "alice@example.com", "hash");
        profile.agents.push(AgentGrant::new("a1", vec!["READ".into()]));

        assert!(profile.grant("a1").is_some());
        assert!(profile.grant("a2").is_none());
    }
}
