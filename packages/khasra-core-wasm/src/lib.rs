use js_sys::Date;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

// Create a console module for logging
pub mod console;
// Shared data structures
pub mod models;
// Extraction error taxonomy
pub mod error;
// Layer rule chain
pub mod classify;
// Centroids and distances
pub mod geometry;
// KMZ archive access
pub mod kmz;
// KML markup to features
pub mod kml_parser;
// Archive bytes to dataset
pub mod extract;
// Threshold-graph clustering
pub mod clustering;
// Map view from feature bounds
pub mod bounds;
// Layer filtering and tabular preview
pub mod preview;
#[cfg(test)]
mod test_support;

use crate::bounds::{OVERVIEW_ZOOM, PREVIEW_ZOOM};
use crate::clustering::ClusterOptions;
use crate::error::ErrorPayload;
use crate::models::{Cluster, ClusterSummary, Feature, Layer};
use crate::preview::PREVIEW_ROW_LIMIT;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

// Use the macros from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => ($crate::console::log(&format!($($t)*)))
}

#[macro_export]
macro_rules! console_warn {
    ($($t:tt)*) => ($crate::console::warn(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("khasra core initialized");
    });
}

// Maps become plain JS objects so property bags read like GeoJSON properties
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(JsValue::from)
}

fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

/// Extract features from KMZ bytes.
///
/// Resolves to `{ features, columns, defaultIdColumn }`; rejects with
/// `{ kind: "decode" | "parse", message }`.
#[wasm_bindgen(js_name = extractFeatures)]
pub fn extract_features(bytes: &[u8]) -> Result<JsValue, JsValue> {
    console_log!("Extracting features from {} byte archive", bytes.len());
    match extract::extract_features(bytes) {
        Ok(dataset) => to_js(&dataset),
        Err(err) => {
            console_warn!("Error parsing KMZ file: {}", err);
            Err(to_js(&ErrorPayload::from(&err))?)
        }
    }
}

/// Cluster features whose centroids lie within `threshold` of each other.
#[wasm_bindgen(js_name = clusterFeatures)]
pub fn cluster_features(features: JsValue, threshold: f64) -> Result<JsValue, JsValue> {
    let options = ClusterOptions {
        threshold,
        ..ClusterOptions::default()
    };
    run_clustering(features, &options)
}

/// Same as `clusterFeatures` with `{ threshold?, strategy?: "scan" | "indexed" }`.
#[wasm_bindgen(js_name = clusterFeaturesWithOptions)]
pub fn cluster_features_with_options(features: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let options: ClusterOptions = if options.is_undefined() || options.is_null() {
        ClusterOptions::default()
    } else {
        from_js(options, "cluster options")?
    };
    run_clustering(features, &options)
}

fn run_clustering(features: JsValue, options: &ClusterOptions) -> Result<JsValue, JsValue> {
    let features: Vec<Feature> = from_js(features, "features")?;

    let started = Date::now();
    let clusters = clustering::cluster_with_options(&features, options);
    console_log!(
        "Clustered {} features into {} clusters (threshold {}, {:?} search) in {:.1} ms",
        features.len(),
        clusters.len(),
        options.threshold,
        options.strategy,
        Date::now() - started
    );

    to_js(&clusters)
}

#[wasm_bindgen(js_name = summarizeClusters)]
pub fn summarize_clusters(clusters: JsValue, total_features: usize) -> Result<JsValue, JsValue> {
    let clusters: Vec<Cluster> = from_js(clusters, "clusters")?;
    to_js(&ClusterSummary::from_clusters(&clusters, total_features))
}

#[wasm_bindgen(js_name = filterFeaturesByLayers)]
pub fn filter_features_by_layers(features: JsValue, layers: JsValue) -> Result<JsValue, JsValue> {
    let features: Vec<Feature> = from_js(features, "features")?;
    let layers: Vec<Layer> = from_js(layers, "layers")?;
    to_js(&preview::features_in_layers(&features, &layers))
}

/// Tabular preview of the first rows, five unless `limit` says otherwise.
#[wasm_bindgen(js_name = previewTable)]
pub fn preview_table(features: JsValue, columns: JsValue, limit: Option<usize>) -> Result<JsValue, JsValue> {
    let features: Vec<Feature> = from_js(features, "features")?;
    let columns: Vec<String> = from_js(columns, "columns")?;
    let table = preview::preview_table(&features, &columns, limit.unwrap_or(PREVIEW_ROW_LIMIT));
    to_js(&table)
}

#[wasm_bindgen(js_name = mapView)]
pub fn map_view(features: JsValue, zoom: Option<u8>) -> Result<JsValue, JsValue> {
    let features: Vec<Feature> = from_js(features, "features")?;
    to_js(&bounds::map_view(&features, zoom.unwrap_or(PREVIEW_ZOOM)))
}

// View for the layer and clustering steps
#[wasm_bindgen(js_name = overviewMapView)]
pub fn overview_map_view(features: JsValue) -> Result<JsValue, JsValue> {
    map_view(features, Some(OVERVIEW_ZOOM))
}

/// Layers offered as overlays, in display order. `Other` is appended when
/// `includeOther` is set.
#[wasm_bindgen(js_name = availableLayers)]
pub fn available_layers(include_other: Option<bool>) -> Result<JsValue, JsValue> {
    if include_other.unwrap_or(false) {
        to_js(&Layer::ALL)
    } else {
        to_js(&Layer::SELECTABLE)
    }
}
