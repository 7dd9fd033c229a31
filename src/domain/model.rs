use crate::utils::error::Result;
use crate::utils::validation::validate_coordinate;
use serde::{Deserialize, Serialize};

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting values outside [-90, 90] / [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        validate_coordinate(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Practitioner {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Practitioner {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A practitioner ranked against the caller's position.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorMatch {
    pub practitioner_id: i64,
    pub name: String,
    pub specialization: String,
    pub distance_km: f64,
    pub distance_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub name: String,
    pub coordinate: Coordinate,
}

/// Advice text in the primary language (English) and its translation (Telugu).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub primary: String,
    pub secondary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    pub specialization: String,
    pub emergency: bool,
    pub suggestion: Suggestion,
    pub matched_doctors: Vec<DoctorMatch>,
    pub nearby_facilities: Vec<Facility>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecializationRule {
    pub keyword: String,
    pub specialization: String,
}

impl SpecializationRule {
    pub fn new(keyword: &str, specialization: &str) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
            specialization: specialization.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRequest {
    pub message: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl TriageRequest {
    /// Both fields must be present for the request to carry a position.
    pub fn coordinate(&self) -> Option<Result<Coordinate>> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

// 對外回應格式 (camelCase)

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDto {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    pub distance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityDto {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageResponse {
    pub ai_suggestion_english: String,
    pub ai_suggestion_telugu: String,
    pub recommended_doctors: Vec<DoctorDto>,
    pub nearby_hospitals: Vec<FacilityDto>,
    pub is_emergency: bool,
}

impl From<AggregateResult> for TriageResponse {
    fn from(result: AggregateResult) -> Self {
        Self {
            ai_suggestion_english: result.suggestion.primary,
            ai_suggestion_telugu: result.suggestion.secondary,
            recommended_doctors: result
                .matched_doctors
                .into_iter()
                .map(|d| DoctorDto {
                    id: d.practitioner_id,
                    name: d.name,
                    specialization: d.specialization,
                    distance: d.distance_label,
                })
                .collect(),
            nearby_hospitals: result
                .nearby_facilities
                .into_iter()
                .map(|f| FacilityDto {
                    name: f.name,
                    latitude: f.coordinate.latitude,
                    longitude: f.coordinate.longitude,
                })
                .collect(),
            is_emergency: result.emergency,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: "OK".to_string(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
