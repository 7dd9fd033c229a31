use crate::domain::model::Suggestion;
use crate::domain::ports::{ChatBackend, ChatMessage};
use crate::utils::error::{Result, TriageError};
use regex::Regex;
use std::sync::{Arc, LazyLock};

pub const DEFAULT_MAX_TOKENS: u32 = 400;

const PRIMARY_KEY: &str = "aiSuggestionEnglish";
const SECONDARY_KEY: &str = "aiSuggestionTelugu";

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[a-zA-Z]*\n?").expect("code fence pattern is valid"));

/// Asks the chat backend for bilingual advice; always produces a [`Suggestion`].
pub struct SuggestionGenerator<B: ChatBackend> {
    backend: Arc<B>,
    max_tokens: u32,
}

impl<B: ChatBackend> SuggestionGenerator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub async fn generate(&self, message: &str, specialization: &str) -> Suggestion {
        match self.try_generate(message, specialization).await {
            Ok(suggestion) => suggestion,
            Err(e) => {
                tracing::warn!(
                    "AI bilingual suggestion unavailable, using fallback. Reason: {}",
                    e
                );
                fallback_suggestion(specialization)
            }
        }
    }

    async fn try_generate(&self, message: &str, specialization: &str) -> Result<Suggestion> {
        let prompt = build_prompt(message, specialization);
        let raw = self
            .backend
            .complete(vec![ChatMessage::user(prompt)], self.max_tokens)
            .await?;
        tracing::debug!("AI backend returned {} characters", raw.len());
        parse_suggestion(&raw)
    }
}

pub fn build_prompt(message: &str, specialization: &str) -> String {
    format!(
        "You are a medical assistant. User symptoms: \"{message}\"\n\
         Recommended specialist: {specialization}\n\n\
         Reply ONLY as JSON (no code fences, no extra text):\n\
         {{\"{PRIMARY_KEY}\":\"brief English advice max 60 words\",\
         \"{SECONDARY_KEY}\":\"same advice in Telugu\"}}"
    )
}

pub fn fallback_suggestion(specialization: &str) -> Suggestion {
    Suggestion {
        primary: format!(
            "Based on your symptoms, I recommend consulting a {}. \
             Please seek professional medical advice for an accurate diagnosis.",
            specialization
        ),
        secondary: format!(
            "మీ లక్షణాల ఆధారంగా, {}ని సంప్రదించమని సిఫారసు చేస్తున్నాను. \
             సరైన నిర్ధారణ కోసం వైద్య సహాయం తీసుకోండి.",
            specialization
        ),
    }
}

/// Strips markdown fences and narrows to the outermost `{ ... }` span.
pub fn extract_json(raw: &str) -> &str {
    let start = raw.find('{');
    let end = raw.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if e > s => &raw[s..=e],
        _ => raw.trim(),
    }
}

pub fn parse_suggestion(raw: &str) -> Result<Suggestion> {
    let cleaned = CODE_FENCE.replace_all(raw, "").replace("```", "");
    let value: serde_json::Value = serde_json::from_str(extract_json(&cleaned))?;

    let field = |key: &str| -> Result<String> {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| TriageError::MalformedResponse {
                service: "chat backend".to_string(),
                message: format!("missing or empty '{}'", key),
            })
    };

    Ok(Suggestion {
        primary: field(PRIMARY_KEY)?,
        secondary: field(SECONDARY_KEY)?,
    })
}
