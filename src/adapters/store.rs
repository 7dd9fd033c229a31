use crate::domain::model::Practitioner;
use crate::domain::ports::PractitionerStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Practitioner directory held in memory. Queries return rows in insertion
/// order, which is what distance ties fall back to.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPractitionerStore {
    practitioners: Vec<Practitioner>,
}

impl InMemoryPractitionerStore {
    pub fn new(practitioners: Vec<Practitioner>) -> Self {
        Self { practitioners }
    }

    /// Loads a JSON array of practitioners.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let store = Self::from_json_str(&content)?;
        tracing::info!(
            "Loaded {} practitioners from {}",
            store.len(),
            path.as_ref().display()
        );
        Ok(store)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let practitioners: Vec<Practitioner> = serde_json::from_str(content)?;
        Ok(Self::new(practitioners))
    }

    pub fn len(&self) -> usize {
        self.practitioners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.practitioners.is_empty()
    }
}

#[async_trait]
impl PractitionerStore for InMemoryPractitionerStore {
    async fn find_by_specialization_and_available(
        &self,
        specialization: &str,
    ) -> Result<Vec<Practitioner>> {
        Ok(self
            .practitioners
            .iter()
            .filter(|p| p.available && p.specialization == specialization)
            .cloned()
            .collect())
    }

    async fn find_all_available(&self) -> Result<Vec<Practitioner>> {
        Ok(self
            .practitioners
            .iter()
            .filter(|p| p.available)
            .cloned()
            .collect())
    }
}
