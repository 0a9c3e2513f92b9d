//! # warrant-store
//!
//! Persistence for user profiles, their agent grants, and the agent directory.
//!
//! The server depends only on the [`ProfileStore`] and [`AgentStore`] traits.
//! Two backends implement both:
//!
//! - [`MemoryStore`]: process-local maps, used by default and in tests.
//! - [`SqliteStore`]: a sqlx SQLite pool with embedded migrations.

pub mod error;
pub mod memory;
pub mod models;
pub mod sqlite;
pub mod storage;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use models::{AgentGrant, AgentIdentity, UserProfile};
pub use sqlite::SqliteStore;
pub use storage::{AgentStore, ProfileStore};
