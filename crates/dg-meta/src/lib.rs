//! Push-broom sensor metadata: typed records parsed from vendor XML.
//!
//! Each block of the metadata file (`IMD`, `GEO`, `EPH`, `ATT`, `RPB`) is read
//! by a dedicated builder which records the sub-blocks it has seen in a
//! [`Completeness`] tracker. A builder only turns into its finished record
//! once every sub-block has been parsed; anything less fails with
//! [`MetaError::Incomplete`].
//!
//! ```rust,no_run
//! use dg_meta::{read_xml, ReadOptions};
//!
//! # fn run() -> Result<(), dg_meta::MetaError> {
//! let meta = read_xml("scene.xml", &ReadOptions::default())?;
//! println!("{} TLC entries, {} ephemeris samples", meta.image.tlc.len(), meta.ephemeris.len());
//! # Ok(())
//! # }
//! ```

pub mod attitude;
pub mod completeness;
pub mod ephemeris;
pub mod geometric;
pub mod image;
mod list;
pub mod reader;
pub mod rpc;

#[cfg(test)]
mod fixtures;

use dg_xml::XmlError;
use thiserror::Error;

pub use attitude::{AttitudeMetadata, AttitudeXml};
pub use completeness::Completeness;
pub use ephemeris::{EphemerisMetadata, EphemerisXml};
pub use geometric::{GeometricMetadata, GeometricXml};
pub use image::{ImageMetadata, ImageXml};
pub use reader::{
    parse_xml_str, read_rpc_file, read_rpc_str, read_xml, xml_image_size, SensorMetadata,
};
pub use rpc::{reconcile_rpc, Coefficients, Datum, RpcModel, RpcSchema, RpcXml};

/// Error type produced while reading sensor metadata.
#[derive(Debug, Error)]
pub enum MetaError {
    /// A required tag or section is absent.
    #[error("not found: {0}")]
    NotFound(String),
    /// The content is present but semantically invalid.
    #[error("argument error: {0}")]
    Argument(String),
    /// A list does not hold the number of entries it declares.
    #[error("io error: {0}")]
    Io(String),
    /// The file uses a feature this reader does not model.
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// A record was requested before all of its sub-blocks were parsed.
    #[error("incomplete {object}: missing {}", .missing.join(", "))]
    Incomplete {
        object: &'static str,
        missing: Vec<&'static str>,
    },
    /// Any failure while reading a file, tagged with the file name.
    #[error("{source}; XML file \"{path}\" is invalid")]
    InvalidFile {
        path: String,
        #[source]
        source: Box<MetaError>,
    },
    /// Malformed document or value text.
    #[error(transparent)]
    Xml(XmlError),
}

impl MetaError {
    /// The error beneath any [`MetaError::InvalidFile`] wrapping.
    pub fn root_cause(&self) -> &MetaError {
        match self {
            MetaError::InvalidFile { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn in_file(self, path: impl Into<String>) -> Self {
        MetaError::InvalidFile {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

impl From<XmlError> for MetaError {
    fn from(err: XmlError) -> Self {
        match err {
            XmlError::NotFound { parent, tag } => {
                MetaError::NotFound(format!("<{tag}> under <{parent}>"))
            }
            other => MetaError::Xml(other),
        }
    }
}

/// How label-indexed ephemeris and attitude lists are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexPolicy {
    /// Every index in `[0, count)` must be written exactly once.
    #[default]
    Strict,
    /// Only the total entry count is checked; duplicate labels overwrite
    /// earlier entries and skipped indices stay zeroed.
    Permissive,
}

/// Options controlling a metadata read.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub index_policy: IndexPolicy,
}

impl ReadOptions {
    pub fn permissive() -> Self {
        ReadOptions {
            index_policy: IndexPolicy::Permissive,
        }
    }
}
