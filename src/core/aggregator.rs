use crate::core::advisor::{fallback_suggestion, SuggestionGenerator};
use crate::core::doctor_search::DoctorSearch;
use crate::core::facility::FacilityFetcher;
use crate::core::specialization::{is_emergency, SpecializationDetector};
use crate::domain::model::{AggregateResult, Coordinate, TriageRequest};
use crate::domain::ports::{ChatBackend, FacilitySource, PractitionerStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_BRANCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Runs the advice, practitioner and facility lookups side by side and merges
/// whatever each of them produced. Every branch has a default, so
/// [`TriageAggregator::process`] always returns a complete result.
pub struct TriageAggregator<S, B, F>
where
    S: PractitionerStore + 'static,
    B: ChatBackend + 'static,
    F: FacilitySource + 'static,
{
    detector: Arc<SpecializationDetector>,
    advisor: Arc<SuggestionGenerator<B>>,
    doctors: Arc<DoctorSearch<S>>,
    facilities: Arc<FacilityFetcher<F>>,
    branch_timeout: Duration,
}

impl<S, B, F> TriageAggregator<S, B, F>
where
    S: PractitionerStore + 'static,
    B: ChatBackend + 'static,
    F: FacilitySource + 'static,
{
    pub fn new(
        detector: SpecializationDetector,
        advisor: SuggestionGenerator<B>,
        doctors: DoctorSearch<S>,
        facilities: FacilityFetcher<F>,
    ) -> Self {
        Self {
            detector: Arc::new(detector),
            advisor: Arc::new(advisor),
            doctors: Arc::new(doctors),
            facilities: Arc::new(facilities),
            branch_timeout: DEFAULT_BRANCH_TIMEOUT,
        }
    }

    pub fn with_branch_timeout(mut self, branch_timeout: Duration) -> Self {
        self.branch_timeout = branch_timeout;
        self
    }

    pub async fn process(&self, request: &TriageRequest) -> AggregateResult {
        let origin = match request.coordinate() {
            Some(Ok(coordinate)) => Some(coordinate),
            Some(Err(e)) => {
                tracing::warn!("Ignoring request position: {}", e);
                None
            }
            None => None,
        };
        self.aggregate(&request.message, origin).await
    }

    pub async fn aggregate(&self, message: &str, origin: Option<Coordinate>) -> AggregateResult {
        let specialization: Arc<str> = Arc::from(self.detector.detect(message));
        let emergency = is_emergency(message);
        tracing::info!(
            specialization = %specialization,
            emergency,
            located = origin.is_some(),
            "Detected specialization"
        );

        // 三個分支互不相依，同時派發後在下方一起等待
        let ai_task = {
            let advisor = Arc::clone(&self.advisor);
            let message: Arc<str> = Arc::from(message);
            let specialization = Arc::clone(&specialization);
            tokio::spawn(async move { advisor.generate(&message, &specialization).await })
        };

        let doctor_task = origin.map(|origin| {
            let doctors = Arc::clone(&self.doctors);
            let specialization = Arc::clone(&specialization);
            tokio::spawn(async move { doctors.find_nearby(origin, &specialization).await })
        });

        let facility_task = origin.map(|origin| {
            let facilities = Arc::clone(&self.facilities);
            tokio::spawn(async move { facilities.fetch_nearby(origin).await })
        });

        let (suggestion, matched_doctors, nearby_facilities) = tokio::join!(
            settle("ai suggestion", Some(ai_task), self.branch_timeout, || {
                fallback_suggestion(&specialization)
            }),
            settle("doctor search", doctor_task, self.branch_timeout, Vec::new),
            settle("facility lookup", facility_task, self.branch_timeout, Vec::new)
        );

        tracing::info!(
            "Aggregated {} doctor(s) and {} facility(ies)",
            matched_doctors.len(),
            nearby_facilities.len()
        );

        AggregateResult {
            specialization: specialization.to_string(),
            emergency,
            suggestion,
            matched_doctors,
            nearby_facilities,
        }
    }
}

/// Waits for one branch, substituting `default` when it was never scheduled,
/// panicked, or ran past `limit`.
async fn settle<T>(
    branch: &str,
    task: Option<JoinHandle<T>>,
    limit: Duration,
    default: impl FnOnce() -> T,
) -> T {
    let Some(mut task) = task else {
        return default();
    };

    match tokio::time::timeout(limit, &mut task).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            tracing::warn!("{} branch failed to complete: {}", branch, e);
            default()
        }
        Err(_) => {
            task.abort();
            tracing::warn!("{} branch timed out after {:?}", branch, limit);
            default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryPractitionerStore;
    use crate::core::geo::offset_north;
    use crate::domain::model::Practitioner;
    use crate::domain::ports::ChatMessage;
    use crate::utils::error::{Result, TriageError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Barrier;

    const ORIGIN: Coordinate = Coordinate {
        latitude: 17.4,
        longitude: 78.4,
    };

    const GOOD_REPLY: &str =
        r#"{"aiSuggestionEnglish":"Go to a cardiologist.","aiSuggestionTelugu":"కార్డియాలజిస్ట్ వద్దకు వెళ్ళండి."}"#;

    enum Behaviour {
        Reply(&'static str),
        Fail,
        Panic,
        Hang,
    }

    struct MockBackend {
        behaviour: Behaviour,
        barrier: Option<Arc<Barrier>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatBackend for MockBackend {
        async fn complete(&self, _: Vec<ChatMessage>, _: u32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            match self.behaviour {
                Behaviour::Reply(text) => Ok(text.to_string()),
                Behaviour::Fail => Err(TriageError::UpstreamStatus {
                    service: "chat backend".to_string(),
                    status: 502,
                }),
                Behaviour::Panic => panic!("backend exploded"),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }
    }

    struct MockSource {
        body: Option<String>,
        barrier: Option<Arc<Barrier>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FacilitySource for MockSource {
        async fn query(&self, _: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            self.body.clone().ok_or_else(|| TriageError::UpstreamStatus {
                service: "overpass".to_string(),
                status: 429,
            })
        }
    }

    struct CountingStore {
        inner: InMemoryPractitionerStore,
        barrier: Option<Arc<Barrier>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PractitionerStore for CountingStore {
        async fn find_by_specialization_and_available(
            &self,
            specialization: &str,
        ) -> Result<Vec<Practitioner>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            self.inner
                .find_by_specialization_and_available(specialization)
                .await
        }

        async fn find_all_available(&self) -> Result<Vec<Practitioner>> {
            self.inner.find_all_available().await
        }
    }

    fn cardiologist_at(km: f64) -> Practitioner {
        let at = offset_north(ORIGIN, km);
        Practitioner {
            id: 11,
            name: "Dr. Lakshmi".to_string(),
            specialization: "Cardiologist".to_string(),
            latitude: at.latitude,
            longitude: at.longitude,
            available: true,
        }
    }

    fn hospital_body() -> String {
        let at = offset_north(ORIGIN, 1.0);
        serde_json::json!({
            "elements": [{"type": "node", "lat": at.latitude, "lon": at.longitude, "tags": {"name": "Yashoda Hospital"}}]
        })
        .to_string()
    }

    struct Fixture {
        store: Arc<CountingStore>,
        backend: Arc<MockBackend>,
        source: Arc<MockSource>,
    }

    impl Fixture {
        fn new(behaviour: Behaviour, body: Option<String>, barrier: Option<Arc<Barrier>>) -> Self {
            Self {
                store: Arc::new(CountingStore {
                    inner: InMemoryPractitionerStore::new(vec![cardiologist_at(3.0)]),
                    barrier: barrier.clone(),
                    calls: AtomicUsize::new(0),
                }),
                backend: Arc::new(MockBackend {
                    behaviour,
                    barrier: barrier.clone(),
                    calls: AtomicUsize::new(0),
                }),
                source: Arc::new(MockSource {
                    body,
                    barrier,
                    calls: AtomicUsize::new(0),
                }),
            }
        }

        fn aggregator(&self) -> TriageAggregator<CountingStore, MockBackend, MockSource> {
            TriageAggregator::new(
                SpecializationDetector::default(),
                SuggestionGenerator::new(self.backend.clone()),
                DoctorSearch::new(self.store.clone()),
                FacilityFetcher::new(self.source.clone()),
            )
        }
    }

    #[tokio::test]
    async fn test_all_branches_populated() {
        let fixture = Fixture::new(Behaviour::Reply(GOOD_REPLY), Some(hospital_body()), None);

        let result = fixture
            .aggregator()
            .aggregate("severe chest pain", Some(ORIGIN))
            .await;

        assert_eq!(result.specialization, "Cardiologist");
        assert!(result.emergency);
        assert_eq!(result.suggestion.primary, "Go to a cardiologist.");
        assert_eq!(result.matched_doctors.len(), 1);
        assert_eq!(result.matched_doctors[0].distance_label, "3.0 km");
        assert_eq!(result.nearby_facilities.len(), 1);
        assert_eq!(result.nearby_facilities[0].name, "Yashoda Hospital");
    }

    #[tokio::test]
    async fn test_branches_run_concurrently() {
        // 若分支是依序執行，barrier 永遠等不到三方到齊，只會得到逾時預設值
        let barrier = Arc::new(Barrier::new(3));
        let fixture = Fixture::new(
            Behaviour::Reply(GOOD_REPLY),
            Some(hospital_body()),
            Some(barrier),
        );
        let aggregator = fixture.aggregator().with_branch_timeout(Duration::from_secs(5));

        let result = aggregator.aggregate("chest pain", Some(ORIGIN)).await;

        assert_eq!(result.suggestion.primary, "Go to a cardiologist.");
        assert_eq!(result.matched_doctors.len(), 1);
        assert_eq!(result.nearby_facilities.len(), 1);
    }

    #[tokio::test]
    async fn test_without_coordinate_only_ai_branch_runs() {
        let fixture = Fixture::new(Behaviour::Reply(GOOD_REPLY), Some(hospital_body()), None);

        let result = fixture.aggregator().aggregate("chest pain", None).await;

        assert_eq!(result.suggestion.primary, "Go to a cardiologist.");
        assert!(result.matched_doctors.is_empty());
        assert!(result.nearby_facilities.is_empty());
        assert_eq!(fixture.backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fixture.store.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fixture.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_facility_failure_does_not_affect_siblings() {
        let fixture = Fixture::new(Behaviour::Reply(GOOD_REPLY), None, None);

        let result = fixture.aggregator().aggregate("chest pain", Some(ORIGIN)).await;

        assert!(result.nearby_facilities.is_empty());
        assert_eq!(result.matched_doctors.len(), 1);
        assert_eq!(result.suggestion.primary, "Go to a cardiologist.");
    }

    #[tokio::test]
    async fn test_backend_error_yields_fallback() {
        let fixture = Fixture::new(Behaviour::Fail, Some(hospital_body()), None);

        let result = fixture.aggregator().aggregate("chest pain", Some(ORIGIN)).await;

        assert_eq!(result.suggestion, fallback_suggestion("Cardiologist"));
        assert_eq!(result.matched_doctors.len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_branch_is_isolated() {
        let fixture = Fixture::new(Behaviour::Panic, Some(hospital_body()), None);

        let result = fixture.aggregator().aggregate("chest pain", Some(ORIGIN)).await;

        assert_eq!(result.suggestion, fallback_suggestion("Cardiologist"));
        assert_eq!(result.matched_doctors.len(), 1);
        assert_eq!(result.nearby_facilities.len(), 1);
    }

    #[tokio::test]
    async fn test_hung_branch_times_out() {
        let fixture = Fixture::new(Behaviour::Hang, Some(hospital_body()), None);
        let aggregator = fixture
            .aggregator()
            .with_branch_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let result = aggregator.aggregate("tooth ache", Some(ORIGIN)).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(result.suggestion, fallback_suggestion("Dentist"));
        assert_eq!(result.nearby_facilities.len(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_request_position_is_ignored() {
        let fixture = Fixture::new(Behaviour::Reply(GOOD_REPLY), Some(hospital_body()), None);
        let request = TriageRequest {
            message: "chest pain".to_string(),
            latitude: Some(123.0),
            longitude: Some(78.4),
        };

        let result = fixture.aggregator().process(&request).await;

        assert!(result.matched_doctors.is_empty());
        assert!(result.nearby_facilities.is_empty());
        assert_eq!(fixture.source.calls.load(Ordering::SeqCst), 0);
    }
}
