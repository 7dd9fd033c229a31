// Application layer: wires configuration and concrete adapters into the triage core.

use crate::adapters::{InMemoryPractitionerStore, OpenAiChatClient, OverpassClient};
use crate::config::TriageConfig;
use crate::core::advisor::SuggestionGenerator;
use crate::core::aggregator::TriageAggregator;
use crate::core::doctor_search::DoctorSearch;
use crate::core::facility::FacilityFetcher;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use std::path::Path;
use std::sync::Arc;

pub type DefaultAggregator<S = InMemoryPractitionerStore> =
    TriageAggregator<S, OpenAiChatClient, OverpassClient>;

/// Builds the production aggregator: OpenAI-compatible chat client, Overpass
/// client and the given practitioner store.
pub fn build_aggregator<S>(config: &TriageConfig, store: Arc<S>) -> Result<DefaultAggregator<S>>
where
    S: crate::core::PractitionerStore + 'static,
{
    let backend = Arc::new(OpenAiChatClient::new(
        config.chat_endpoint()?,
        config.chat.temperature,
        config.chat_timeout(),
    )?);
    let source = Arc::new(OverpassClient::new(
        &config.facilities.endpoint,
        config.facility_timeout(),
    )?);

    let aggregator = TriageAggregator::new(
        config.detector(),
        SuggestionGenerator::new(backend).with_max_tokens(config.chat.max_tokens),
        DoctorSearch::new(store).with_limits(config.doctor_radius_km(), config.max_doctors()),
        FacilityFetcher::new(source).with_limits(config.facility_radius_km(), config.max_facilities()),
    )
    .with_branch_timeout(config.branch_timeout());

    Ok(aggregator)
}

/// Loads the practitioner file named in the config. A missing file yields an
/// empty directory so the advice branch still works.
pub fn load_store(config: &TriageConfig) -> Result<InMemoryPractitionerStore> {
    let path = Path::new(&config.store.practitioners_path);
    if !path.exists() {
        tracing::warn!(
            "Practitioner file {} not found, doctor search will return no results",
            path.display()
        );
        return Ok(InMemoryPractitionerStore::default());
    }
    InMemoryPractitionerStore::from_json_file(path)
}
