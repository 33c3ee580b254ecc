use crate::models::{BoundingBox, GeoPoint};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine distance between two `GeoPoint`s
#[inline]
pub fn distance_between(from: GeoPoint, to: GeoPoint) -> f64 {
    haversine_distance(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Calculate a bounding box around a center point
///
/// Cheaper than Haversine, used to pre-filter before the exact check.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / 111.0;

    // Near the poles cos() goes to zero; clamp so the box spans every longitude
    let lon_scale = 111.0 * lat.to_radians().cos().abs();
    let lon_delta = if lon_scale > 1e-9 {
        radius_km / lon_scale
    } else {
        180.0
    };

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lon: lon - lon_delta,
        max_lon: lon + lon_delta,
    }
}

/// Check if a point is within a bounding box
///
/// Longitude bounds past ±180° wrap around the antimeridian.
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat && lat <= bbox.max_lat && within_longitude_span(lon, bbox.min_lon, bbox.max_lon)
}

fn within_longitude_span(lon: f64, min_lon: f64, max_lon: f64) -> bool {
    if max_lon - min_lon >= 360.0 {
        true
    } else if min_lon < -180.0 {
        lon >= min_lon + 360.0 || lon <= max_lon
    } else if max_lon > 180.0 {
        lon <= max_lon - 360.0 || lon >= min_lon
    } else {
        lon >= min_lon && lon <= max_lon
    }
}

/// True when `point` lies within `radius_km` of `origin`
pub fn within_radius(origin: GeoPoint, point: GeoPoint, radius_km: f64) -> bool {
    let bbox = calculate_bounding_box(origin.latitude, origin.longitude, radius_km);
    is_within_bounding_box(point.latitude, point.longitude, &bbox)
        && distance_between(origin, point) <= radius_km
}
