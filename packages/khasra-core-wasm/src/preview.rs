use crate::models::{Feature, Layer, PreviewTable};

pub const PREVIEW_ROW_LIMIT: usize = 5;
pub const MISSING_VALUE_PLACEHOLDER: &str = "-";

/// Keep features whose layer is selected, in input order.
pub fn features_in_layers(features: &[Feature], layers: &[Layer]) -> Vec<Feature> {
    features
        .iter()
        .filter(|feature| layers.contains(&feature.layer))
        .cloned()
        .collect()
}

/// Render the first `limit` features as string rows in `columns` order.
pub fn preview_table(features: &[Feature], columns: &[String], limit: usize) -> PreviewTable {
    let rows: Vec<Vec<String>> = features
        .iter()
        .take(limit)
        .map(|feature| {
            columns
                .iter()
                .map(|column| match feature.property(column) {
                    Some(value) if !value.is_empty() => value.to_string(),
                    _ => MISSING_VALUE_PLACEHOLDER.to_string(),
                })
                .collect()
        })
        .collect();

    PreviewTable {
        columns: columns.to_vec(),
        shown: rows.len(),
        total: features.len(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Geometry, Properties};

    fn feature(name: &str, layer: Layer, extra: &[(&str, &str)]) -> Feature {
        let mut properties = Properties::new();
        properties.insert("name".to_string(), name.to_string());
        for (k, v) in extra {
            properties.insert(k.to_string(), v.to_string());
        }
        Feature::new(Geometry::Point([0.0, 0.0]), properties, layer)
    }

    #[test]
    fn filters_by_selected_layers() {
        let features = vec![
            feature("a", Layer::Water, &[]),
            feature("b", Layer::Other, &[]),
            feature("c", Layer::Buildings, &[]),
            feature("d", Layer::Water, &[]),
        ];
        let kept = features_in_layers(&features, &[Layer::Water, Layer::Buildings]);
        let names: Vec<_> = kept.iter().filter_map(|f| f.property("name")).collect();
        assert_eq!(names, vec!["a", "c", "d"]);

        assert_eq!(features_in_layers(&features, &Layer::SELECTABLE).len(), 3);
        assert!(features_in_layers(&features, &[]).is_empty());
    }

    #[test]
    fn preview_uses_placeholders_and_limit() {
        let features: Vec<Feature> = (0..7)
            .map(|i| {
                let name = format!("K-{}", i);
                match i {
                    0 => feature(&name, Layer::Crops, &[]),
                    1 => feature(&name, Layer::Crops, &[("owner", "")]),
                    _ => feature(&name, Layer::Crops, &[("owner", "Singh")]),
                }
            })
            .collect();
        let columns = vec!["name".to_string(), "owner".to_string()];

        let table = preview_table(&features, &columns, PREVIEW_ROW_LIMIT);
        assert_eq!(table.shown, 5);
        assert_eq!(table.total, 7);
        assert_eq!(table.rows[0], vec!["K-0", "-"]);
        assert_eq!(table.rows[1], vec!["K-1", "-"]);
        assert_eq!(table.rows[2], vec!["K-2", "Singh"]);
    }

    #[test]
    fn preview_of_empty_dataset() {
        let table = preview_table(&[], &[], PREVIEW_ROW_LIMIT);
        assert_eq!(table.shown, 0);
        assert!(table.rows.is_empty());
    }
}
