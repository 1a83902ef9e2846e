//! Idea catalog collaborator.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use sreel_models::{IdeaConfig, IdeaId};

use crate::error::{SchedulerError, SchedulerResult};

/// Source of idea configurations. Idea CRUD lives outside this backend;
/// the scheduler only reads the persona x country combinations.
#[async_trait]
pub trait IdeaCatalog: Send + Sync {
    /// Fetch one idea's configuration, `None` if unknown.
    async fn get_idea(&self, id: &IdeaId) -> SchedulerResult<Option<IdeaConfig>>;
}

/// Process-local idea catalog, optionally seeded from a JSON document.
#[derive(Default)]
pub struct MemoryIdeaCatalog {
    ideas: RwLock<HashMap<IdeaId, IdeaConfig>>,
}

impl MemoryIdeaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON array of idea configurations.
    pub fn from_json_file(path: impl AsRef<Path>) -> SchedulerResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SchedulerError::validation(format!(
                "cannot read idea catalog {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let ideas: Vec<IdeaConfig> = serde_json::from_str(&raw)
            .map_err(|e| SchedulerError::validation(format!("invalid idea catalog: {}", e)))?;

        let map: HashMap<IdeaId, IdeaConfig> = ideas
            .into_iter()
            .map(|idea| (idea.id.clone(), idea))
            .collect();
        Ok(Self {
            ideas: RwLock::new(map),
        })
    }

    /// Insert or replace an idea.
    pub async fn insert(&self, idea: IdeaConfig) {
        self.ideas.write().await.insert(idea.id.clone(), idea);
    }
}

#[async_trait]
impl IdeaCatalog for MemoryIdeaCatalog {
    async fn get_idea(&self, id: &IdeaId) -> SchedulerResult<Option<IdeaConfig>> {
        Ok(self.ideas.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sreel_models::{Country, Persona, PersonaConfig};

    #[tokio::test]
    async fn test_insert_and_get() {
        let catalog = MemoryIdeaCatalog::new();
        catalog
            .insert(IdeaConfig {
                id: IdeaId::from("idea-1"),
                personas: vec![PersonaConfig {
                    persona: Persona::from("founder"),
                    countries: vec![Country::from("us")],
                }],
            })
            .await;

        let idea = catalog
            .get_idea(&IdeaId::from("idea-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(idea.combinations().len(), 1);

        assert!(catalog
            .get_idea(&IdeaId::from("missing"))
            .await
            .unwrap()
            .is_none());
    }
}
