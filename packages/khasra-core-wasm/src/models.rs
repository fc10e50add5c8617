// This is the models module containing shared data structures
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// (longitude, latitude) in degrees
pub type LngLat = [f64; 2];

pub type Properties = IndexMap<String, String>;

/// Geometry of a placemark, laid out like a GeoJSON geometry object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(LngLat),
    LineString(Vec<LngLat>),
    /// Rings; index 0 is the outer boundary and the only one consumed here.
    Polygon(Vec<Vec<LngLat>>),
}

impl Geometry {
    /// Vertices that represent this geometry: the point itself, every line
    /// vertex, or the outer ring of a polygon.
    pub fn vertices(&self) -> &[LngLat] {
        match self {
            Geometry::Point(point) => std::slice::from_ref(point),
            Geometry::LineString(coords) => coords,
            Geometry::Polygon(rings) => rings.first().map(Vec::as_slice).unwrap_or(&[]),
        }
    }
}

/// Thematic layer a feature is sorted into.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Buildings,
    Settlements,
    Crops,
    Water,
    Slopes,
    Other,
}

impl Layer {
    pub const ALL: [Layer; 6] = [
        Layer::Buildings,
        Layer::Settlements,
        Layer::Crops,
        Layer::Water,
        Layer::Slopes,
        Layer::Other,
    ];

    /// Layers offered as map overlays. `Other` is never offered.
    pub const SELECTABLE: [Layer; 5] = [
        Layer::Buildings,
        Layer::Settlements,
        Layer::Crops,
        Layer::Water,
        Layer::Slopes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Buildings => "Buildings",
            Layer::Settlements => "Settlements",
            Layer::Crops => "Crops",
            Layer::Water => "Water",
            Layer::Slopes => "Slopes",
            Layer::Other => "Other",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed placemark. Serialized as a GeoJSON `Feature` with an extra
/// `layer` member.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Properties,
    pub layer: Layer,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Properties, layer: Layer) -> Self {
        Feature {
            geometry,
            properties,
            layer,
        }
    }

    pub fn property(&self, column: &str) -> Option<&str> {
        self.properties.get(column).map(String::as_str)
    }
}

/// Result of extracting one uploaded archive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDataset {
    pub features: Vec<Feature>,
    /// Distinct property keys across all features, sorted.
    pub columns: Vec<String>,
    pub default_id_column: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClusterMember {
    pub feature: Feature,
    pub centroid: LngLat,
    /// Position of the feature in the clustered input sequence.
    pub index: usize,
}

/// A connected component of the threshold graph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: usize,
    /// Breadth-first visitation order.
    pub members: Vec<ClusterMember>,
    pub centroid: LngLat,
    pub size: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub total_clusters: usize,
    pub total_features: usize,
    pub clustered_features: usize,
    pub average_cluster_size: f64,
    pub largest_cluster: usize,
}

/// Where the map should look. `center` is `[lat, lng]`, the order map widgets expect.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
}

/// First rows of a dataset rendered as strings, for the upload preview.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub shown: usize,
    pub total: usize,
}
