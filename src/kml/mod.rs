//! KML feature tree.
//!
//! Only the subset needed for basin boundaries is modelled: Document and
//! Folder containers, Placemarks with a single geometry, and extended data
//! given either as `SchemaData`/`SimpleData` or as `Data`/`value` pairs.

mod parse;

use geo::Coord;

pub use parse::{load_kml, parse_kml};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Document,
    Folder,
}

/// A node of the parsed feature tree
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Container {
        kind: ContainerKind,
        name: Option<String>,
        children: Vec<Feature>,
    },
    Placemark(Placemark),
}

impl Feature {
    /// Number of placemarks in this subtree
    pub fn placemark_count(&self) -> usize {
        match self {
            Feature::Container { children, .. } => {
                children.iter().map(Feature::placemark_count).sum()
            }
            Feature::Placemark(_) => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Placemark {
    pub name: Option<String>,
    pub geometry: Option<Geometry>,
    pub extended_data: Vec<ExtendedDataElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord<f64>),
    LineString(Vec<Coord<f64>>),
    Polygon {
        exterior: Vec<Coord<f64>>,
        interiors: Vec<Vec<Coord<f64>>>,
    },
    /// Any geometry we don't interpret, keyed by element name
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendedDataElement {
    SchemaData {
        schema_url: Option<String>,
        fields: Vec<DataField>,
    },
    Data(DataField),
}

impl ExtendedDataElement {
    pub fn fields(&self) -> &[DataField] {
        match self {
            ExtendedDataElement::SchemaData { fields, .. } => fields,
            ExtendedDataElement::Data(field) => std::slice::from_ref(field),
        }
    }
}
