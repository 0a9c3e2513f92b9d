//! Behaviour shared by every store backend.
//!
//! Run with: cargo test --package warrant-store --test store_contract

use std::sync::Arc;
use warrant_store::{
    AgentIdentity, AgentStore, MemoryStore, ProfileStore, SqliteStore, StoreError, UserProfile,
};

fn perms(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn alice() -> UserProfile {
    UserProfile::new("alice", "Alice", "alice@example.com", "a".repeat(160))
}

async fn profile_contract(store: Arc<dyn ProfileStore>) {
    store.insert_profile(alice()).await.unwrap();

    // Duplicate username and duplicate email are both rejected.
    let err = store.insert_profile(alice()).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));
    let err = store
        .insert_profile(UserProfile::new("alice2", "A", "alice@example.com", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));

    let by_name = store.lookup_profile("alice").await.unwrap().unwrap();
    assert_eq!(by_name.email, "alice@example.com");
    assert!(by_name.agents.is_empty());
    let by_email = store
        .find_profile_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.username, "alice");
    assert!(store.lookup_profile("nobody").await.unwrap().is_none());

    // Grants.
    let grant = store
        .append_agent_grant("alice", "agent-1", perms(&["READ"]))
        .await
        .unwrap();
    assert_eq!(grant.permissions, perms(&["READ"]));

    let err = store
        .append_agent_grant("alice", "agent-1", perms(&["WRITE"]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));

    let err = store
        .append_agent_grant("nobody", "agent-1", perms(&["READ"]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    store
        .append_agent_grant("alice", "agent-2", perms(&[]))
        .await
        .unwrap();

    let found = store
        .find_agent_grant("alice", "agent-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.agent_id, "agent-1");
    assert!(
        store
            .find_agent_grant("alice", "agent-9")
            .await
            .unwrap()
            .is_none()
    );

    let updated = store
        .update_agent_grant_permissions("alice", "agent-1", perms(&["READ", "WRITE"]))
        .await
        .unwrap();
    assert_eq!(updated.permissions, perms(&["READ", "WRITE"]));

    let err = store
        .update_agent_grant_permissions("alice", "agent-9", perms(&["READ"]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let profile = store.lookup_profile("alice").await.unwrap().unwrap();
    let ids: Vec<&str> = profile.agents.iter().map(|g| g.agent_id.as_str()).collect();
    assert_eq!(ids, ["agent-1", "agent-2"]);
    assert_eq!(profile.agents[0].permissions, perms(&["READ", "WRITE"]));
    assert!(profile.updated_at >= profile.created_at);
}

async fn agent_contract(store: Arc<dyn AgentStore>) {
    let agent = AgentIdentity::new("crawler", "b".repeat(160));
    let uid = agent.agent_uid.clone();
    store.insert_agent(agent).await.unwrap();

    let err = store
        .insert_agent(AgentIdentity::new("crawler", "c".repeat(160)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));

    let found = store.find_agent("crawler").await.unwrap().unwrap();
    assert_eq!(found.agent_uid, uid);
    assert_eq!(found.password, "b".repeat(160));
    assert!(store.find_agent("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_store_contract() {
    let store = Arc::new(MemoryStore::new());
    profile_contract(store.clone()).await;
    agent_contract(store).await;
}

#[tokio::test]
async fn test_sqlite_in_memory_contract() {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    profile_contract(store.clone()).await;
    agent_contract(store).await;
}

#[tokio::test]
async fn test_sqlite_file_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("warrant.sqlite");

    {
        let store = SqliteStore::open(&path).await.unwrap();
        store.insert_profile(alice()).await.unwrap();
        store
            .append_agent_grant("alice", "agent-1", perms(&["READ"]))
            .await
            .unwrap();
        store.pool().close().await;
    }

    let reopened = SqliteStore::open(&path).await.unwrap();
    let grant = reopened
        .find_agent_grant("alice", "agent-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(grant.permissions, perms(&["READ"]));
}
