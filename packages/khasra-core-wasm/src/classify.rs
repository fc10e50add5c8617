use crate::models::Layer;

/// One step of the layer rule chain: any keyword present selects `layer`.
#[derive(Debug, Clone, Copy)]
pub struct LayerRule {
    pub keywords: &'static [&'static str],
    pub layer: Layer,
}

impl LayerRule {
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

/// Evaluated top to bottom, first match wins. A text mentioning both a
/// building and water is a building.
pub const LAYER_RULES: &[LayerRule] = &[
    LayerRule {
        keywords: &["building"],
        layer: Layer::Buildings,
    },
    LayerRule {
        keywords: &["settlement", "city", "town"],
        layer: Layer::Settlements,
    },
    LayerRule {
        keywords: &["crop", "agriculture", "farm"],
        layer: Layer::Crops,
    },
    LayerRule {
        keywords: &["water", "river", "lake"],
        layer: Layer::Water,
    },
    LayerRule {
        keywords: &["slope", "elevation", "terrain"],
        layer: Layer::Slopes,
    },
];

/// Run `rules` over already lower-cased text.
pub fn classify_text(text: &str, rules: &[LayerRule]) -> Layer {
    rules
        .iter()
        .find(|rule| rule.matches(text))
        .map(|rule| rule.layer)
        .unwrap_or(Layer::Other)
}

/// Infer the layer of a placemark from its name and description.
pub fn classify_placemark(name: &str, description: &str) -> Layer {
    let text = format!("{} {}", name, description).to_lowercase();
    classify_text(&text, LAYER_RULES)
}
