use geo_types::{coord, Coord};

use crate::models::{Geometry, LngLat};

/// Representative point of a feature.
///
/// Points stand for themselves; lines and polygons use the unweighted mean of
/// their vertices (outer ring only for polygons). Returns `None` when there is
/// nothing to average. Not-a-number vertices are not filtered and make the
/// centroid not-a-number.
pub fn feature_centroid(geometry: &Geometry) -> Option<Coord<f64>> {
    match geometry {
        Geometry::Point([lng, lat]) => Some(coord! { x: *lng, y: *lat }),
        Geometry::LineString(coords) => mean_of(coords),
        Geometry::Polygon(rings) => rings.first().and_then(|ring| mean_of(ring)),
    }
}

pub fn mean_of(points: &[LngLat]) -> Option<Coord<f64>> {
    if points.is_empty() {
        return None;
    }
    let (sum_lng, sum_lat) = points
        .iter()
        .fold((0.0, 0.0), |(lng, lat), p| (lng + p[0], lat + p[1]));
    let n = points.len() as f64;
    Some(coord! { x: sum_lng / n, y: sum_lat / n })
}

// Plane Euclidean distance on raw degrees, no geodesic correction
pub fn planar_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dlng = a.x - b.x;
    let dlat = a.y - b.y;
    (dlng * dlng + dlat * dlat).sqrt()
}

pub fn to_lng_lat(c: Coord<f64>) -> LngLat {
    [c.x, c.y]
}
