use crate::domain::model::SpecializationRule;

pub const DEFAULT_SPECIALIZATION: &str = "General Physician";

// 順序即優先權：較具體/緊急的關鍵字必須排在通用關鍵字前面
const CANONICAL_RULES: &[(&str, &str)] = &[
    ("chest pain", "Cardiologist"),
    ("heart", "Cardiologist"),
    ("palpitation", "Cardiologist"),
    ("skin rash", "Dermatologist"),
    ("rash", "Dermatologist"),
    ("acne", "Dermatologist"),
    ("eye pain", "Ophthalmologist"),
    ("blurry vision", "Ophthalmologist"),
    ("red eye", "Ophthalmologist"),
    ("tooth", "Dentist"),
    ("dental", "Dentist"),
    ("bone", "Orthopedist"),
    ("joint pain", "Orthopedist"),
    ("fracture", "Orthopedist"),
    ("child", "Pediatrician"),
    ("baby", "Pediatrician"),
    ("mental", "Psychiatrist"),
    ("anxiety", "Psychiatrist"),
    ("depression", "Psychiatrist"),
    ("stomach", "Gastroenterologist"),
    ("diarrhea", "Gastroenterologist"),
    ("vomit", "Gastroenterologist"),
    ("fever", "General Physician"),
    ("body pain", "General Physician"),
    ("headache", "General Physician"),
    ("cold", "General Physician"),
    ("cough", "General Physician"),
    ("fatigue", "General Physician"),
];

const EMERGENCY_PHRASES: &[&str] = &[
    "chest pain",
    "heart attack",
    "can't breathe",
    "difficulty breathing",
    "severe bleeding",
    "suicide",
    "suicidal",
    "stroke",
    "unconscious",
    "severe headache",
    "can't move",
    "paralysis",
    "seizure",
];

pub fn canonical_rules() -> Vec<SpecializationRule> {
    CANONICAL_RULES
        .iter()
        .map(|(keyword, specialization)| SpecializationRule::new(keyword, specialization))
        .collect()
}

/// First-match keyword classifier. The rule table is fixed at construction.
#[derive(Debug, Clone)]
pub struct SpecializationDetector {
    rules: Vec<SpecializationRule>,
    default_specialization: String,
}

impl Default for SpecializationDetector {
    fn default() -> Self {
        Self::new(canonical_rules(), DEFAULT_SPECIALIZATION)
    }
}

impl SpecializationDetector {
    pub fn new(rules: Vec<SpecializationRule>, default_specialization: &str) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| SpecializationRule {
                keyword: rule.keyword.to_lowercase(),
                specialization: rule.specialization,
            })
            .collect();

        Self {
            rules,
            default_specialization: default_specialization.to_string(),
        }
    }

    pub fn rules(&self) -> &[SpecializationRule] {
        &self.rules
    }

    pub fn detect(&self, message: &str) -> &str {
        let lower = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lower.contains(&rule.keyword))
            .map(|rule| rule.specialization.as_str())
            .unwrap_or(&self.default_specialization)
    }
}

pub fn is_emergency(message: &str) -> bool {
    let lower = message.to_lowercase();
    EMERGENCY_PHRASES.iter().any(|phrase| lower.contains(phrase))
}
