use crate::domain::model::{Coordinate, Facility};
use crate::domain::ports::FacilitySource;
use crate::utils::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_FACILITY_RADIUS_KM: f64 = 5.0;
pub const DEFAULT_MAX_FACILITIES: usize = 5;
pub const UNNAMED_FACILITY: &str = "Unnamed Hospital";

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<LatLon>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

/// Looks up hospitals around a point.
///
/// Elements that carry no position at all are reported at the caller's own
/// coordinate. Consumers that plot or rank these results should treat such
/// entries as "somewhere within the search radius", not as exact locations.
pub struct FacilityFetcher<F: FacilitySource> {
    source: Arc<F>,
    radius_km: f64,
    max_results: usize,
}

impl<F: FacilitySource> FacilityFetcher<F> {
    pub fn new(source: Arc<F>) -> Self {
        Self {
            source,
            radius_km: DEFAULT_FACILITY_RADIUS_KM,
            max_results: DEFAULT_MAX_FACILITIES,
        }
    }

    pub fn with_limits(mut self, radius_km: f64, max_results: usize) -> Self {
        self.radius_km = radius_km;
        self.max_results = max_results;
        self
    }

    /// Never fails: any transport or parse problem yields an empty list.
    pub async fn fetch_nearby(&self, origin: Coordinate) -> Vec<Facility> {
        let query = build_query(origin, self.radius_km);
        let body = match self.source.query(&query).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Facility lookup failed: {}", e);
                return Vec::new();
            }
        };

        match parse_facilities(&body, origin, self.max_results) {
            Ok(facilities) => {
                tracing::debug!("Parsed {} nearby facilities", facilities.len());
                facilities
            }
            Err(e) => {
                tracing::warn!("Facility response could not be parsed: {}", e);
                Vec::new()
            }
        }
    }
}

pub fn build_query(origin: Coordinate, radius_km: f64) -> String {
    let radius_m = (radius_km * 1000.0) as i64;
    let around = format!(
        "(around:{},{:.6},{:.6})",
        radius_m, origin.latitude, origin.longitude
    );
    format!(
        "[out:json][timeout:10];(node[\"amenity\"=\"hospital\"]{around};way[\"amenity\"=\"hospital\"]{around};);out center;"
    )
}

pub fn parse_facilities(json: &str, origin: Coordinate, max_results: usize) -> Result<Vec<Facility>> {
    let response: OverpassResponse = serde_json::from_str(json)?;

    let facilities = response
        .elements
        .into_iter()
        .take(max_results)
        .map(|el| {
            let name = el
                .tags
                .get("name")
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .unwrap_or(UNNAMED_FACILITY)
                .to_string();

            // way 用 center，node 用自身座標，都沒有時退回使用者座標
            let coordinate = match el.center {
                Some(c) => Coordinate {
                    latitude: c.lat,
                    longitude: c.lon,
                },
                None => Coordinate {
                    latitude: el.lat.unwrap_or(origin.latitude),
                    longitude: el.lon.unwrap_or(origin.longitude),
                },
            };

            Facility { name, coordinate }
        })
        .collect();

    Ok(facilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::TriageError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const ORIGIN: Coordinate = Coordinate {
        latitude: 17.4,
        longitude: 78.4,
    };

    struct CannedSource {
        body: std::result::Result<String, ()>,
        seen: Mutex<Option<String>>,
    }

    #[async_trait]
    impl FacilitySource for CannedSource {
        async fn query(&self, query: &str) -> Result<String> {
            *self.seen.lock().unwrap() = Some(query.to_string());
            self.body.clone().map_err(|_| TriageError::UpstreamStatus {
                service: "overpass".to_string(),
                status: 504,
            })
        }
    }

    fn make_fetcher(body: std::result::Result<String, ()>) -> (FacilityFetcher<CannedSource>, Arc<CannedSource>) {
        let source = Arc::new(CannedSource {
            body,
            seen: Mutex::new(None),
        });
        (FacilityFetcher::new(source.clone()), source)
    }

    #[test]
    fn test_build_query() {
        let query = build_query(ORIGIN, 5.0);
        assert_eq!(
            query,
            "[out:json][timeout:10];(node[\"amenity\"=\"hospital\"](around:5000,17.400000,78.400000);way[\"amenity\"=\"hospital\"](around:5000,17.400000,78.400000););out center;"
        );
    }

    #[test]
    fn test_parse_nodes_ways_and_defaults() {
        let json = serde_json::json!({
            "elements": [
                {"type": "node", "lat": 17.41, "lon": 78.41, "tags": {"name": "Care Hospital"}},
                {"type": "way", "center": {"lat": 17.39, "lon": 78.38}, "tags": {"name": "  "}},
                {"type": "way", "tags": {"amenity": "hospital"}}
            ]
        })
        .to_string();

        let facilities = parse_facilities(&json, ORIGIN, 5).unwrap();

        assert_eq!(facilities.len(), 3);
        assert_eq!(facilities[0].name, "Care Hospital");
        assert_eq!(facilities[0].coordinate.latitude, 17.41);
        assert_eq!(facilities[1].name, UNNAMED_FACILITY);
        assert_eq!(facilities[1].coordinate.longitude, 78.38);
        assert_eq!(facilities[2].name, UNNAMED_FACILITY);
        assert_eq!(facilities[2].coordinate, ORIGIN);
    }

    #[test]
    fn test_parse_caps_results_and_tolerates_missing_elements() {
        let elements: Vec<_> = (0..9)
            .map(|i| serde_json::json!({"lat": 17.0 + i as f64 / 100.0, "lon": 78.0, "tags": {"name": format!("H{}", i)}}))
            .collect();
        let json = serde_json::json!({ "elements": elements }).to_string();

        let facilities = parse_facilities(&json, ORIGIN, 5).unwrap();
        assert_eq!(facilities.len(), 5);
        assert_eq!(facilities[4].name, "H4");

        assert!(parse_facilities("{}", ORIGIN, 5).unwrap().is_empty());
        assert!(parse_facilities("not json", ORIGIN, 5).is_err());
    }

    #[tokio::test]
    async fn test_fetch_sends_query_and_parses() {
        let body = r#"{"elements":[{"lat":17.401,"lon":78.402,"tags":{"name":"Apollo"}}]}"#;
        let (fetcher, source) = make_fetcher(Ok(body.to_string()));

        let facilities = fetcher.fetch_nearby(ORIGIN).await;

        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].name, "Apollo");
        let seen = source.seen.lock().unwrap().clone().unwrap();
        assert!(seen.contains("around:5000"));
    }

    #[tokio::test]
    async fn test_fetch_failure_and_bad_body_are_empty() {
        let (fetcher, _) = make_fetcher(Err(()));
        assert!(fetcher.fetch_nearby(ORIGIN).await.is_empty());

        let (fetcher, _) = make_fetcher(Ok("<html>rate limited</html>".to_string()));
        assert!(fetcher.fetch_nearby(ORIGIN).await.is_empty());
    }
}
