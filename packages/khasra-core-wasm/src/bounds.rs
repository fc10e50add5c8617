use geo_types::{coord, Rect};

use crate::models::{Feature, MapView};

// `[lat, lng]` before any data is loaded
pub const DEFAULT_CENTER: [f64; 2] = [20.0, 0.0];
pub const DEFAULT_ZOOM: u8 = 2;
pub const PREVIEW_ZOOM: u8 = 10;
pub const OVERVIEW_ZOOM: u8 = 6;

impl Default for MapView {
    fn default() -> Self {
        MapView {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

// NaN-propagating min/max: one bad vertex poisons the bounds
fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// Bounding rectangle of every vertex of every feature.
pub fn feature_bounds(features: &[Feature]) -> Option<Rect<f64>> {
    let mut vertices = features.iter().flat_map(|f| f.geometry.vertices().iter());
    let first = vertices.next()?;

    let mut min_lng = first[0];
    let mut min_lat = first[1];
    let mut max_lng = first[0];
    let mut max_lat = first[1];

    for point in vertices {
        min_lng = nan_min(min_lng, point[0]);
        min_lat = nan_min(min_lat, point[1]);
        max_lng = nan_max(max_lng, point[0]);
        max_lat = nan_max(max_lat, point[1]);
    }

    Some(Rect::new(
        coord! { x: min_lng, y: min_lat },
        coord! { x: max_lng, y: max_lat },
    ))
}

/// Centre the map on the features' bounds at `zoom`. Falls back to the
/// default view when there is nothing to show or the bounds are not finite.
pub fn map_view(features: &[Feature], zoom: u8) -> MapView {
    match feature_bounds(features) {
        Some(bounds) => {
            let center = bounds.center();
            if center.x.is_finite() && center.y.is_finite() {
                MapView {
                    center: [center.y, center.x],
                    zoom,
                }
            } else {
                MapView::default()
            }
        }
        None => MapView::default(),
    }
}
