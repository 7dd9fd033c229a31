use crate::domain::model::Practitioner;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Read-only access to the practitioner directory.
#[async_trait]
pub trait PractitionerStore: Send + Sync {
    async fn find_by_specialization_and_available(
        &self,
        specialization: &str,
    ) -> Result<Vec<Practitioner>>;

    async fn find_all_available(&self) -> Result<Vec<Practitioner>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A chat-completion model. Returns the text of the first completion.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String>;
}

/// An Overpass-style POI service: takes a query, returns the raw JSON body.
#[async_trait]
pub trait FacilitySource: Send + Sync {
    async fn query(&self, query: &str) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn doctor_radius_km(&self) -> f64;
    fn max_doctors(&self) -> usize;
    fn facility_radius_km(&self) -> f64;
    fn max_facilities(&self) -> usize;
    fn default_specialization(&self) -> &str;
    fn branch_timeout(&self) -> Duration;
}
