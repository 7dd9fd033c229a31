use crate::core::geo::{distance_km, format_distance};
use crate::domain::model::{Coordinate, DoctorMatch, Practitioner};
use crate::domain::ports::PractitionerStore;
use crate::utils::error::Result;
use std::sync::Arc;

pub const DEFAULT_DOCTOR_RADIUS_KM: f64 = 10.0;
pub const DEFAULT_MAX_DOCTORS: usize = 5;

/// Ranks available practitioners by distance from the caller.
pub struct DoctorSearch<S: PractitionerStore> {
    store: Arc<S>,
    radius_km: f64,
    max_results: usize,
}

impl<S: PractitionerStore> DoctorSearch<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            radius_km: DEFAULT_DOCTOR_RADIUS_KM,
            max_results: DEFAULT_MAX_DOCTORS,
        }
    }

    pub fn with_limits(mut self, radius_km: f64, max_results: usize) -> Self {
        self.radius_km = radius_km;
        self.max_results = max_results;
        self
    }

    /// Never fails: store errors are logged and yield an empty list.
    pub async fn find_nearby(&self, origin: Coordinate, specialization: &str) -> Vec<DoctorMatch> {
        match self.candidates(specialization).await {
            Ok(candidates) => {
                let matches = rank(origin, candidates, self.radius_km, self.max_results);
                tracing::debug!(
                    "Found {} practitioner(s) within {} km",
                    matches.len(),
                    self.radius_km
                );
                matches
            }
            Err(e) => {
                tracing::warn!("Practitioner lookup failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn candidates(&self, specialization: &str) -> Result<Vec<Practitioner>> {
        let matched = self
            .store
            .find_by_specialization_and_available(specialization)
            .await?;
        if !matched.is_empty() {
            return Ok(matched);
        }

        // 沒有對應專科時退回所有可看診的醫師
        tracing::debug!(
            "No available {} found, widening to all available practitioners",
            specialization
        );
        self.store.find_all_available().await
    }
}

/// Radius filter, stable nearest-first sort, truncation.
pub fn rank(
    origin: Coordinate,
    candidates: Vec<Practitioner>,
    radius_km: f64,
    max_results: usize,
) -> Vec<DoctorMatch> {
    let mut within: Vec<(Practitioner, f64)> = candidates
        .into_iter()
        .map(|p| {
            let distance = distance_km(origin, p.coordinate());
            (p, distance)
        })
        .filter(|(_, distance)| *distance <= radius_km)
        .collect();

    // sort_by 是穩定排序，距離相同時保留資料來源原本的順序
    within.sort_by(|a, b| a.1.total_cmp(&b.1));

    within
        .into_iter()
        .take(max_results)
        .map(|(p, distance)| DoctorMatch {
            practitioner_id: p.id,
            name: p.name,
            specialization: p.specialization,
            distance_km: distance,
            distance_label: format_distance(distance),
        })
        .collect()
}
