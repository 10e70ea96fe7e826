//! Error taxonomy for the basin pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = BasinError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BasinError {
    /// KML file missing, unreadable or malformed
    #[error("failed to parse KML {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Polygon placemark without the expected extended-data fields
    #[error("placemark {placemark:?} is missing extended data field `{field}`")]
    Schema {
        placemark: Option<String>,
        field: &'static str,
    },

    /// Cache file unreadable or not decodable into the expected shape
    #[error("cache file {} is corrupt: {message}", .path.display())]
    CacheCorrupt { path: PathBuf, message: String },

    /// Selected basin absent from the dictionary
    #[error("basin `{0}` not found in basin dictionary")]
    MissingBasin(String),

    #[error("failed to write mask to {}: {message}", .path.display())]
    MaskWrite { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BasinError {
    pub(crate) fn parse(source_name: impl Into<String>, message: impl ToString) -> Self {
        BasinError::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }
}
