//! Boundary tests, run with `wasm-pack test --node`.
#![cfg(target_arch = "wasm32")]

use std::io::{Cursor, Write};

use js_sys::Reflect;
use khasra_core_wasm::models::{Cluster, ClusterSummary, ExtractedDataset, MapView};
use khasra_core_wasm::{
    available_layers, cluster_features, cluster_features_with_options, extract_features,
    map_view, overview_map_view, summarize_clusters,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn kmz(kml: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("doc.kml", SimpleFileOptions::default())
        .expect("start entry");
    writer.write_all(kml.as_bytes()).expect("write entry");
    writer.finish().expect("finish archive").into_inner()
}

const SURVEY: &str = r#"<kml><Document>
  <Placemark><name>A</name><Point><coordinates>0,0</coordinates></Point></Placemark>
  <Placemark><name>B</name><Point><coordinates>1,0</coordinates></Point></Placemark>
  <Placemark><name>C</name><ExtendedData><Data name="khasra"><value>77</value></Data></ExtendedData>
    <Point><coordinates>10,10</coordinates></Point></Placemark>
</Document></kml>"#;

#[wasm_bindgen_test]
fn extract_then_cluster() {
    let dataset = extract_features(&kmz(SURVEY)).expect("extract");
    let parsed: ExtractedDataset = serde_wasm_bindgen::from_value(dataset.clone()).expect("dataset");
    assert_eq!(parsed.features.len(), 3);
    assert_eq!(parsed.default_id_column, "description");

    // Properties arrive as plain objects
    let features = Reflect::get(&dataset, &JsValue::from_str("features")).expect("features");
    let clusters = cluster_features(features.clone(), 2.0).expect("cluster");
    let clusters_vec: Vec<Cluster> = serde_wasm_bindgen::from_value(clusters.clone()).expect("clusters");
    assert_eq!(clusters_vec.len(), 2);
    assert_eq!(clusters_vec[0].centroid, [0.5, 0.0]);

    let summary: ClusterSummary =
        serde_wasm_bindgen::from_value(summarize_clusters(clusters, 3).expect("summary")).expect("summary");
    assert_eq!(summary.total_clusters, 2);

    let view: MapView = serde_wasm_bindgen::from_value(map_view(features, None).expect("view")).expect("view");
    assert_eq!(view.center, [5.0, 5.0]);
    assert_eq!(view.zoom, 10);
}

#[wasm_bindgen_test]
fn overview_view_zooms_out() {
    let dataset = extract_features(&kmz(SURVEY)).expect("extract");
    let features = Reflect::get(&dataset, &JsValue::from_str("features")).expect("features");
    let view: MapView =
        serde_wasm_bindgen::from_value(overview_map_view(features).expect("view")).expect("view");
    assert_eq!(view.center, [5.0, 5.0]);
    assert_eq!(view.zoom, 6);
}

#[wasm_bindgen_test]
fn options_default_when_missing() {
    let dataset = extract_features(&kmz(SURVEY)).expect("extract");
    let features = Reflect::get(&dataset, &JsValue::from_str("features")).expect("features");
    let clusters = cluster_features_with_options(features, JsValue::UNDEFINED).expect("cluster");
    let clusters: Vec<Cluster> = serde_wasm_bindgen::from_value(clusters).expect("clusters");
    // Default threshold of 25 joins everything
    assert_eq!(clusters.len(), 1);
}

#[wasm_bindgen_test]
fn errors_carry_kind() {
    let err = extract_features(b"not a zip").unwrap_err();
    let kind = Reflect::get(&err, &JsValue::from_str("kind")).expect("kind");
    assert_eq!(kind.as_string().as_deref(), Some("decode"));

    let err = extract_features(&kmz("<kml><Document></kml>")).unwrap_err();
    let kind = Reflect::get(&err, &JsValue::from_str("kind")).expect("kind");
    assert_eq!(kind.as_string().as_deref(), Some("parse"));
}

#[wasm_bindgen_test]
fn lists_selectable_layers() {
    let layers: Vec<String> =
        serde_wasm_bindgen::from_value(available_layers(None).expect("layers")).expect("layers");
    assert_eq!(layers, vec!["Buildings", "Settlements", "Crops", "Water", "Slopes"]);

    let all: Vec<String> =
        serde_wasm_bindgen::from_value(available_layers(Some(true)).expect("layers")).expect("layers");
    assert_eq!(all.last().map(String::as_str), Some("Other"));
    assert_eq!(all.len(), 6);
}
