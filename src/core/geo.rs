use crate::domain::model::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres (haversine).
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Renders a distance as e.g. "2.4 km".
pub fn format_distance(km: f64) -> String {
    format!("{:.1} km", km)
}

/// Point reached by travelling `km` due north (positive) or south (negative).
pub fn offset_north(origin: Coordinate, km: f64) -> Coordinate {
    Coordinate {
        latitude: origin.latitude + (km / EARTH_RADIUS_KM).to_degrees(),
        longitude: origin.longitude,
    }
}
