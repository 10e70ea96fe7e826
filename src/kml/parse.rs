use std::fs;
use std::path::Path;

use geo::Coord;
use roxmltree::{Document, Node};
use tracing::{debug, info};

use super::{ContainerKind, DataField, ExtendedDataElement, Feature, Geometry, Placemark};
use crate::error::{BasinError, Result};

/// Read and parse a KML file into its top-level features
pub fn load_kml<P: AsRef<Path>>(path: P) -> Result<Vec<Feature>> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    info!("Loading KML from {}", source_name);

    let text = fs::read_to_string(path).map_err(|e| BasinError::parse(&source_name, e))?;
    let features = KmlParser::new(&source_name).parse(&text)?;

    info!(
        "Parsed {} placemarks",
        features.iter().map(Feature::placemark_count).sum::<usize>()
    );
    Ok(features)
}

/// Parse KML text held in memory
pub fn parse_kml(text: &str) -> Result<Vec<Feature>> {
    KmlParser::new("<memory>").parse(text)
}

struct KmlParser<'s> {
    source_name: &'s str,
}

impl<'s> KmlParser<'s> {
    fn new(source_name: &'s str) -> Self {
        Self { source_name }
    }

    fn error(&self, message: impl ToString) -> BasinError {
        BasinError::parse(self.source_name, message)
    }

    fn parse(&self, text: &str) -> Result<Vec<Feature>> {
        let doc = Document::parse(text).map_err(|e| self.error(e))?;
        let root = doc.root_element();
        if root.tag_name().name() != "kml" {
            return Err(self.error(format!(
                "expected <kml> root element, found <{}>",
                root.tag_name().name()
            )));
        }
        self.features(root)
    }

    fn features(&self, node: Node) -> Result<Vec<Feature>> {
        let mut features = Vec::new();
        for child in node.children().filter(Node::is_element) {
            let feature = match child.tag_name().name() {
                "Document" => self.container(child, ContainerKind::Document)?,
                "Folder" => self.container(child, ContainerKind::Folder)?,
                "Placemark" => Feature::Placemark(self.placemark(child)?),
                other => {
                    debug!("Ignoring <{}> element", other);
                    continue;
                }
            };
            features.push(feature);
        }
        Ok(features)
    }

    fn container(&self, node: Node, kind: ContainerKind) -> Result<Feature> {
        Ok(Feature::Container {
            kind,
            name: child_text(node, "name"),
            children: self.features(node)?,
        })
    }

    fn placemark(&self, node: Node) -> Result<Placemark> {
        let mut placemark = Placemark {
            name: child_text(node, "name"),
            ..Default::default()
        };

        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "ExtendedData" => placemark.extended_data = self.extended_data(child)?,
                "Polygon" | "Point" | "LineString" | "LinearRing" | "MultiGeometry" | "Model"
                | "Track" => {
                    if placemark.geometry.is_none() {
                        placemark.geometry = Some(self.geometry(child)?);
                    }
                }
                _ => {}
            }
        }

        Ok(placemark)
    }

    fn geometry(&self, node: Node) -> Result<Geometry> {
        let geometry = match node.tag_name().name() {
            "Polygon" => {
                let exterior = child(node, "outerBoundaryIs")
                    .and_then(|b| child(b, "LinearRing"))
                    .ok_or_else(|| self.error("<Polygon> without <outerBoundaryIs><LinearRing>"))?;
                let interiors = node
                    .children()
                    .filter(|n| is_named(n, "innerBoundaryIs"))
                    .filter_map(|b| child(b, "LinearRing"))
                    .map(|ring| self.coordinates(ring))
                    .collect::<Result<Vec<_>>>()?;
                Geometry::Polygon {
                    exterior: self.coordinates(exterior)?,
                    interiors,
                }
            }
            "Point" => {
                let coords = self.coordinates(node)?;
                let first = coords
                    .first()
                    .copied()
                    .ok_or_else(|| self.error("<Point> without coordinates"))?;
                Geometry::Point(first)
            }
            "LineString" => Geometry::LineString(self.coordinates(node)?),
            other => Geometry::Other(other.to_string()),
        };
        Ok(geometry)
    }

    /// Coordinates of the `<coordinates>` child, as `lon,lat[,alt]` tuples
    fn coordinates(&self, node: Node) -> Result<Vec<Coord<f64>>> {
        let text = child(node, "coordinates")
            .and_then(|n| n.text())
            .unwrap_or_default();

        text.split_whitespace()
            .map(|tuple| {
                let mut parts = tuple.split(',').map(str::parse::<f64>);
                match (parts.next(), parts.next()) {
                    (Some(Ok(x)), Some(Ok(y))) => Ok(Coord { x, y }),
                    _ => Err(self.error(format!("invalid coordinate tuple `{}`", tuple))),
                }
            })
            .collect()
    }

    fn extended_data(&self, node: Node) -> Result<Vec<ExtendedDataElement>> {
        let mut elements = Vec::new();
        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "SchemaData" => {
                    let fields = child
                        .children()
                        .filter(|n| is_named(n, "SimpleData"))
                        .map(|n| {
                            Ok(DataField {
                                name: self.name_attribute(n)?,
                                value: n.text().unwrap_or_default().trim().to_string(),
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    elements.push(ExtendedDataElement::SchemaData {
                        schema_url: child.attribute("schemaUrl").map(str::to_string),
                        fields,
                    });
                }
                "Data" => elements.push(ExtendedDataElement::Data(DataField {
                    name: self.name_attribute(child)?,
                    value: child_text(child, "value").unwrap_or_default(),
                })),
                _ => {}
            }
        }
        Ok(elements)
    }

    fn name_attribute(&self, node: Node) -> Result<String> {
        node.attribute("name").map(str::to_string).ok_or_else(|| {
            self.error(format!(
                "<{}> without a name attribute",
                node.tag_name().name()
            ))
        })
    }
}

fn is_named(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_named(n, name))
}

fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
}
