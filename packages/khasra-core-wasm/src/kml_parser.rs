use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::classify::classify_placemark;
use crate::error::ExtractError;
use crate::models::{Feature, Geometry, LngLat, Properties};

pub const UNNAMED: &str = "Unnamed";

/// Element of a parsed markup document. Names are local (namespace prefix dropped).
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ExtractError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// First descendant named `name`, in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// First descendant reached through `path`, each step a descendant of the
    /// previous. Steps are resolved greedily: a match under the first matching
    /// ancestor wins over an earlier match under a later ancestor. This differs
    /// from selector document order only when e.g. `outerBoundaryIs` is nested.
    pub fn find_path(&self, path: &[&str]) -> Option<&Element> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => {
                let mut found = None;
                self.visit_descendants(&mut |el| {
                    if found.is_none() && el.name == *first {
                        found = el.find_path(rest);
                    }
                });
                found
            }
        }
    }

    /// Every descendant named `name`, in document order.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        self.visit_descendants(&mut |el| {
            if el.name == name {
                out.push(el);
            }
        });
        out
    }

    fn visit_descendants<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a Element),
    {
        for child in self.child_elements() {
            visit(child);
            child.visit_descendants(visit);
        }
    }

    /// Concatenated text of all descendants, untrimmed.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }
}

/// Parse a markup document into its root element. Fails on anything that is
/// not well-formed.
pub fn parse_document(xml: &str) -> Result<Element, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                ensure_single_root(&root)?;
                stack.push(Element::from_start(&start)?);
            }
            Event::Empty(start) => {
                ensure_single_root(&root)?;
                let el = Element::from_start(&start)?;
                attach(&mut stack, &mut root, el);
            }
            Event::End(_) => {
                // Name matching is checked by the reader
                let el = stack
                    .pop()
                    .ok_or_else(|| ExtractError::Malformed("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, el);
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Text(text.into_owned())),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(ExtractError::Malformed(
                            "text outside the root element".to_string(),
                        ))
                    }
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Text(text)),
                    None => {
                        return Err(ExtractError::Malformed(
                            "CDATA outside the root element".to_string(),
                        ))
                    }
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no data
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ExtractError::Malformed(format!(
            "element <{}> is never closed",
            open.name
        )));
    }
    root.ok_or_else(|| ExtractError::Malformed("document has no root element".to_string()))
}

fn ensure_single_root(root: &Option<Element>) -> Result<(), ExtractError> {
    match root {
        Some(existing) => Err(ExtractError::Malformed(format!(
            "content after the root element <{}>",
            existing.name
        ))),
        None => Ok(()),
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(el)),
        None => *root = Some(el),
    }
}

/// Parse one coordinate component. Anything that is not a number becomes NaN.
fn parse_component(token: &str) -> f64 {
    token.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// `lng,lat[,alt]` for a single position. A missing or empty component reads as 0.
pub fn parse_point_coordinates(text: &str) -> Option<LngLat> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let mut parts = text.split(',');
    let mut component = || {
        parts
            .next()
            .filter(|part| !part.is_empty())
            .map(parse_component)
            .unwrap_or(0.0)
    };
    let lng = component();
    let lat = component();
    Some([lng, lat])
}

/// Whitespace separated `lng,lat[,alt]` tuples. A missing component is NaN.
pub fn parse_coordinate_list(text: &str) -> Vec<LngLat> {
    text.split_whitespace()
        .map(|tuple| {
            let mut parts = tuple.split(',');
            let lng = parts.next().map(parse_component).unwrap_or(f64::NAN);
            let lat = parts.next().map(parse_component).unwrap_or(f64::NAN);
            [lng, lat]
        })
        .collect()
}

/// Pick the placemark geometry: Point, then LineString, then Polygon.
/// Only the first subelement of the winning kind is read; if its coordinates
/// are missing or empty the placemark has no geometry.
pub fn placemark_geometry(placemark: &Element) -> Option<Geometry> {
    if let Some(point) = placemark.find("Point") {
        let text = point.find("coordinates")?.text_content();
        return parse_point_coordinates(&text).map(Geometry::Point);
    }
    if let Some(line) = placemark.find("LineString") {
        let coords = parse_coordinate_list(&line.find("coordinates")?.text_content());
        return (!coords.is_empty()).then_some(Geometry::LineString(coords));
    }
    if let Some(polygon) = placemark.find("Polygon") {
        let ring = polygon.find_path(&["outerBoundaryIs", "LinearRing", "coordinates"])?;
        let coords = parse_coordinate_list(&ring.text_content());
        return (!coords.is_empty()).then_some(Geometry::Polygon(vec![coords]));
    }
    None
}

/// `(key, value)` pairs of every `ExtendedData` > `Data` entry.
pub fn extended_data(placemark: &Element) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for ext in placemark.find_all("ExtendedData") {
        for data in ext.find_all("Data") {
            let key = match data.attribute("name") {
                Some(key) if !key.is_empty() => key.to_string(),
                _ => continue,
            };
            let value = data.find("value").map(Element::text_content).unwrap_or_default();
            entries.push((key, value));
        }
    }
    entries
}

/// Decode a placemark. `None` when it has no usable geometry.
pub fn decode_placemark(placemark: &Element) -> Option<Feature> {
    let geometry = placemark_geometry(placemark)?;

    let name = placemark
        .find("name")
        .map(Element::text_content)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNNAMED.to_string());
    let description = placemark
        .find("description")
        .map(Element::text_content)
        .unwrap_or_default();
    let layer = classify_placemark(&name, &description);

    let mut properties = Properties::new();
    properties.insert("name".to_string(), name);
    properties.insert("description".to_string(), description);
    properties.insert("layer".to_string(), layer.to_string());
    // Extended data may overwrite the base columns in place
    for (key, value) in extended_data(placemark) {
        properties.insert(key, value);
    }

    Some(Feature::new(geometry, properties, layer))
}

/// Decoded features plus the number of placemarks seen, for logging.
pub struct ParsedPlacemarks {
    pub features: Vec<Feature>,
    pub placemark_count: usize,
}

pub fn parse_placemarks(xml: &str) -> Result<ParsedPlacemarks, ExtractError> {
    let root = parse_document(xml)?;
    let placemarks = if root.name == "Placemark" {
        vec![&root]
    } else {
        root.find_all("Placemark")
    };
    let features = placemarks.iter().filter_map(|pm| decode_placemark(pm)).collect();
    Ok(ParsedPlacemarks {
        features,
        placemark_count: placemarks.len(),
    })
}
