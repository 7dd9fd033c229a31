use crate::config::toml_config::{ChatProvider, TriageConfig};
use crate::domain::model::TriageRequest;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "symptom-triage")]
#[command(about = "Suggests a specialist, nearby doctors and hospitals for a symptom description")]
pub struct CliArgs {
    /// Free-text symptom description
    #[arg(short, long)]
    pub message: String,

    /// Caller latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true, requires = "longitude")]
    pub latitude: Option<f64>,

    /// Caller longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true, requires = "latitude")]
    pub longitude: Option<f64>,

    /// Path to TOML configuration file (defaults apply when it does not exist)
    #[arg(short, long, default_value = "triage.toml")]
    pub config: String,

    /// Override store.practitioners_path
    #[arg(long)]
    pub practitioners: Option<String>,

    /// Override chat.provider
    #[arg(long, value_enum)]
    pub provider: Option<ChatProvider>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Show what would be done without contacting any service
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn request(&self) -> TriageRequest {
        TriageRequest {
            message: self.message.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    pub fn apply_overrides(&self, config: &mut TriageConfig) {
        if let Some(path) = &self.practitioners {
            config.store.practitioners_path = path.clone();
            tracing::info!("🔧 Practitioner file overridden to: {}", path);
        }
        if let Some(provider) = self.provider {
            config.chat.provider = provider;
            tracing::info!("🔧 Chat provider overridden to: {:?}", provider);
        }
    }
}
