use std::collections::BTreeSet;

use crate::error::ExtractError;
use crate::kml_parser::parse_placemarks;
use crate::kmz::find_kml_document;
use crate::models::{ExtractedDataset, Feature};
use crate::{console_log, console_warn};

pub const FALLBACK_ID_COLUMN: &str = "name";

/// Extract typed features from KMZ archive bytes.
///
/// Either the whole archive is decoded or an error is returned; there are no
/// partial results. An archive without a `.kml` document is not an error and
/// yields an empty dataset.
pub fn extract_features(bytes: &[u8]) -> Result<ExtractedDataset, ExtractError> {
    let Some(document) = find_kml_document(bytes)? else {
        console_warn!("KMZ archive contains no .kml document");
        return Ok(ExtractedDataset::from_features(Vec::new()));
    };
    if document.content.trim().is_empty() {
        console_warn!("KML document {} is empty", document.name);
        return Ok(ExtractedDataset::from_features(Vec::new()));
    }

    let parsed = parse_placemarks(&document.content)?;
    let dropped = parsed.placemark_count - parsed.features.len();
    console_log!(
        "Parsed {}: {} placemarks, {} features, {} dropped without geometry",
        document.name,
        parsed.placemark_count,
        parsed.features.len(),
        dropped
    );

    Ok(ExtractedDataset::from_features(parsed.features))
}

/// Union of property keys across features, deduplicated and sorted.
pub fn collect_columns(features: &[Feature]) -> Vec<String> {
    features
        .iter()
        .flat_map(|feature| feature.properties.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// First column in sorted order, or `"name"` when there are none.
pub fn default_id_column(columns: &[String]) -> String {
    columns
        .first()
        .cloned()
        .unwrap_or_else(|| FALLBACK_ID_COLUMN.to_string())
}

impl ExtractedDataset {
    pub fn from_features(features: Vec<Feature>) -> Self {
        let columns = collect_columns(&features);
        let default_id_column = default_id_column(&columns);
        ExtractedDataset {
            features,
            columns,
            default_id_column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{Geometry, Layer};
    use crate::test_support::{build_archive, kmz_with_placemarks};

    #[test]
    fn extracts_features_columns_and_default_id() {
        let bytes = kmz_with_placemarks(
            r#"<Placemark>
                 <name>Khasra 12</name>
                 <description>Agriculture plot</description>
                 <ExtendedData>
                   <Data name="area_ha"><value>1.2</value></Data>
                   <Data name="Village"><value>Rampur</value></Data>
                 </ExtendedData>
                 <Polygon><outerBoundaryIs><LinearRing>
                   <coordinates>0,0,0 2,0,0 2,2,0 0,2,0</coordinates>
                 </LinearRing></outerBoundaryIs></Polygon>
               </Placemark>
               <Placemark>
                 <name>Well</name>
                 <ExtendedData><Data name="depth_m"><value>30</value></Data></ExtendedData>
                 <Point><coordinates>1.5,1.5</coordinates></Point>
               </Placemark>
               <Placemark><name>Folder note</name></Placemark>"#,
        );

        let dataset = extract_features(&bytes).expect("extract");
        assert_eq!(dataset.features.len(), 2);
        assert_eq!(dataset.features[0].layer, Layer::Crops);
        assert_eq!(dataset.features[1].geometry, Geometry::Point([1.5, 1.5]));
        assert_eq!(
            dataset.columns,
            vec!["Village", "area_ha", "depth_m", "description", "layer", "name"]
        );
        // Byte order puts upper case first
        assert_eq!(dataset.default_id_column, "Village");
    }

    #[test]
    fn every_returned_feature_has_geometry() {
        let bytes = kmz_with_placemarks(
            "<Placemark><name>a</name></Placemark>\
             <Placemark><Polygon><outerBoundaryIs><LinearRing><coordinates/></LinearRing></outerBoundaryIs></Polygon></Placemark>\
             <Placemark><Polygon></Polygon></Placemark>",
        );
        let dataset = extract_features(&bytes).expect("extract");
        assert!(dataset.features.is_empty());
        assert!(dataset.columns.is_empty());
        assert_eq!(dataset.default_id_column, "name");
    }

    #[test]
    fn extraction_is_repeatable() {
        let bytes = kmz_with_placemarks(
            "<Placemark><name>Town hall</name><Point><coordinates>77.2,28.6</coordinates></Point></Placemark>\
             <Placemark><name>Canal</name><description>water channel</description>\
             <LineString><coordinates>77.0,28.0 77.1,28.1</coordinates></LineString></Placemark>",
        );
        let first = extract_features(&bytes).expect("extract");
        let second = extract_features(&bytes).expect("extract");
        assert_eq!(first, second);
        assert_eq!(first.features[0].layer, Layer::Settlements);
        assert_eq!(first.features[1].layer, Layer::Water);
    }

    #[test]
    fn archive_without_document_is_empty() {
        let bytes = build_archive(&[("images/icon.png", "png")]);
        let dataset = extract_features(&bytes).expect("extract");
        assert!(dataset.features.is_empty());
        assert_eq!(dataset.default_id_column, FALLBACK_ID_COLUMN);
    }

    #[test]
    fn failures_carry_their_kind() {
        let err = extract_features(&[0x50, 0x4b, 0x03, 0x04, 0x00]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let bytes = build_archive(&[("doc.kml", "<kml><Document><Placemark></Document></kml>")]);
        let err = extract_features(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn only_first_document_is_used() {
        let bytes = build_archive(&[
            ("a.kml", "<kml><Placemark><Point><coordinates>1,1</coordinates></Point></Placemark></kml>"),
            ("b.kml", "<kml><Placemark><Point><coordinates>2,2</coordinates></Point></Placemark></kml>"),
        ]);
        let dataset = extract_features(&bytes).expect("extract");
        assert_eq!(dataset.features.len(), 1);
        assert_eq!(dataset.features[0].geometry, Geometry::Point([1.0, 1.0]));
    }
}
