pub mod attachments;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::idea::{Idea, IdeaChanges, NewIdea};

/// Persistent collection of idea records.
/// Implementations: PgStore (Postgres), MemoryStore (in-process, dev/tests).
///
/// Every call touches a single record and is atomic on its own.
#[async_trait]
pub trait IdeaStore: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    async fn insert(&self, idea: NewIdea) -> anyhow::Result<Idea>;

    /// All records in insertion order.
    async fn list(&self) -> anyhow::Result<Vec<Idea>>;

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Idea>>;

    /// Apply `changes` and return the updated record, or `None` if `id` is unknown.
    async fn update(&self, id: Uuid, changes: &IdeaChanges) -> anyhow::Result<Option<Idea>>;

    /// Returns `false` if no record matched.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
