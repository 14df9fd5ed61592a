use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::IdeaStore;
use crate::models::idea::{Idea, IdeaChanges, NewIdea};

/// In-process idea store. Keeps insertion order; everything is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    ideas: RwLock<Vec<Idea>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdeaStore for MemoryStore {
    async fn insert(&self, idea: NewIdea) -> anyhow::Result<Idea> {
        let idea = idea.into_idea(Uuid::new_v4());
        self.ideas.write().await.push(idea.clone());
        Ok(idea)
    }

    async fn list(&self) -> anyhow::Result<Vec<Idea>> {
        Ok(self.ideas.read().await.clone())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Idea>> {
        Ok(self.ideas.read().await.iter().find(|i| i.id == id).cloned())
    }

    async fn update(&self, id: Uuid, changes: &IdeaChanges) -> anyhow::Result<Option<Idea>> {
        let mut ideas = self.ideas.write().await;
        Ok(ideas.iter_mut().find(|i| i.id == id).map(|idea| {
            changes.apply(idea);
            idea.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut ideas = self.ideas.write().await;
        let before = ideas.len();
        ideas.retain(|i| i.id != id);
        Ok(ideas.len() < before)
    }
}
