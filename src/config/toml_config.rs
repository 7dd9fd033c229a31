use crate::adapters::chat::ChatEndpoint;
use crate::adapters::overpass::DEFAULT_OVERPASS_ENDPOINT;
use crate::core::advisor::DEFAULT_MAX_TOKENS;
use crate::core::doctor_search::{DEFAULT_DOCTOR_RADIUS_KM, DEFAULT_MAX_DOCTORS};
use crate::core::facility::{DEFAULT_FACILITY_RADIUS_KM, DEFAULT_MAX_FACILITIES};
use crate::core::specialization::{canonical_rules, SpecializationDetector, DEFAULT_SPECIALIZATION};
use crate::core::ConfigProvider;
use crate::domain::model::SpecializationRule;
use crate::utils::error::{Result, TriageError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub chat: ChatConfig,
    pub facilities: FacilityConfig,
    pub search: SearchConfig,
    pub aggregator: AggregatorConfig,
    pub store: StoreConfig,
    /// Replaces the built-in keyword table when present. Order is priority.
    pub specializations: Option<Vec<SpecializationRule>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ChatProvider {
    #[default]
    Local,
    Hosted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub provider: ChatProvider,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub local: LocalChatConfig,
    pub hosted: HostedChatConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: ChatProvider::Local,
            temperature: 0.7,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_seconds: 30,
            local: LocalChatConfig::default(),
            hosted: HostedChatConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalChatConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for LocalChatConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3:latest".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedChatConfig {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for HostedChatConfig {
    fn default() -> Self {
        Self {
            url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    pub endpoint: String,
    pub radius_km: f64,
    pub max_results: usize,
    pub timeout_seconds: u64,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_ENDPOINT.to_string(),
            radius_km: DEFAULT_FACILITY_RADIUS_KM,
            max_results: DEFAULT_MAX_FACILITIES,
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub doctor_radius_km: f64,
    pub max_doctors: usize,
    pub default_specialization: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            doctor_radius_km: DEFAULT_DOCTOR_RADIUS_KM,
            max_doctors: DEFAULT_MAX_DOCTORS,
            default_specialization: DEFAULT_SPECIALIZATION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub branch_timeout_seconds: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            branch_timeout_seconds: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub practitioners_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            practitioners_path: "practitioners.json".to_string(),
        }
    }
}

impl TriageConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TriageError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TriageError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TriageError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        let chat = &self.chat;
        match chat.provider {
            ChatProvider::Local => {
                validation::validate_url("chat.local.base_url", &chat.local.base_url)?;
                validation::validate_non_empty_string("chat.local.model", &chat.local.model)?;
            }
            ChatProvider::Hosted => {
                validation::validate_url("chat.hosted.url", &chat.hosted.url)?;
                validation::validate_non_empty_string("chat.hosted.model", &chat.hosted.model)?;
                self.hosted_api_key()?;
            }
        }
        validation::validate_range("chat.temperature", chat.temperature, 0.0, 2.0)?;
        validation::validate_positive_number("chat.max_tokens", chat.max_tokens as usize, 1)?;
        validation::validate_positive_number("chat.timeout_seconds", chat.timeout_seconds as usize, 1)?;

        validation::validate_url("facilities.endpoint", &self.facilities.endpoint)?;
        validation::validate_range("facilities.radius_km", self.facilities.radius_km, 0.001, 50.0)?;
        validation::validate_positive_number("facilities.max_results", self.facilities.max_results, 1)?;
        validation::validate_positive_number(
            "facilities.timeout_seconds",
            self.facilities.timeout_seconds as usize,
            1,
        )?;

        validation::validate_range("search.doctor_radius_km", self.search.doctor_radius_km, 0.001, 20_000.0)?;
        validation::validate_positive_number("search.max_doctors", self.search.max_doctors, 1)?;
        validation::validate_non_empty_string(
            "search.default_specialization",
            &self.search.default_specialization,
        )?;

        validation::validate_positive_number(
            "aggregator.branch_timeout_seconds",
            self.aggregator.branch_timeout_seconds as usize,
            1,
        )?;

        validation::validate_path("store.practitioners_path", &self.store.practitioners_path)?;

        if let Some(rules) = &self.specializations {
            for rule in rules {
                validation::validate_non_empty_string("specializations.keyword", &rule.keyword)?;
                validation::validate_non_empty_string(
                    "specializations.specialization",
                    &rule.specialization,
                )?;
            }
        }

        Ok(())
    }

    /// API key for the hosted provider, rejecting unresolved `${VAR}` placeholders.
    fn hosted_api_key(&self) -> Result<&str> {
        let key = validation::validate_required_field("chat.hosted.api_key", &self.chat.hosted.api_key)?;
        if key.trim().is_empty() || key.starts_with("${") {
            return Err(TriageError::MissingConfigError {
                field: "chat.hosted.api_key".to_string(),
            });
        }
        Ok(key.as_str())
    }

    pub fn chat_endpoint(&self) -> Result<ChatEndpoint> {
        match self.chat.provider {
            ChatProvider::Local => Ok(ChatEndpoint::Local {
                base_url: self.chat.local.base_url.clone(),
                model: self.chat.local.model.clone(),
            }),
            ChatProvider::Hosted => Ok(ChatEndpoint::Hosted {
                url: self.chat.hosted.url.clone(),
                model: self.chat.hosted.model.clone(),
                api_key: self.hosted_api_key()?.to_string(),
            }),
        }
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat.timeout_seconds)
    }

    pub fn facility_timeout(&self) -> Duration {
        Duration::from_secs(self.facilities.timeout_seconds)
    }

    pub fn detector(&self) -> SpecializationDetector {
        let rules = self.specializations.clone().unwrap_or_else(canonical_rules);
        SpecializationDetector::new(rules, self.default_specialization())
    }
}

impl Validate for TriageConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

impl ConfigProvider for TriageConfig {
    fn doctor_radius_km(&self) -> f64 {
        self.search.doctor_radius_km
    }

    fn max_doctors(&self) -> usize {
        self.search.max_doctors
    }

    fn facility_radius_km(&self) -> f64 {
        self.facilities.radius_km
    }

    fn max_facilities(&self) -> usize {
        self.facilities.max_results
    }

    fn default_specialization(&self) -> &str {
        &self.search.default_specialization
    }

    fn branch_timeout(&self) -> Duration {
        Duration::from_secs(self.aggregator.branch_timeout_seconds)
    }
}
