#![cfg_attr(docsrs, feature(doc_cfg))]
//! High level facade that re-exports the metadata crates and bundles what a
//! camera model needs before construction: the parsed sensor metadata and an
//! optional bundle-adjustment correction.
//!
//! ```rust,no_run
//! use dg_camera::{load_camera_inputs, meta::ReadOptions, DgCameraError};
//!
//! # fn run() -> Result<(), DgCameraError> {
//! let inputs = load_camera_inputs("scene.xml", Some("run-scene.adjust"), &ReadOptions::default())?;
//! println!(
//!     "{} attitude samples, position correction {}",
//!     inputs.metadata.attitude.len(),
//!     inputs.adjustment.position
//! );
//! # Ok(())
//! # }
//! ```

pub use dg_meta as meta;
pub use dg_xml as xml;

pub mod adjust;
pub mod residuals;

use std::path::Path;

use thiserror::Error;
use tracing::info;

pub use adjust::{read_adjustments, write_adjustments, AdjustError, Adjustment};
pub use dg_meta::{MetaError, ReadOptions, SensorMetadata};
pub use dg_xml::XmlError;
pub use residuals::{
    compute_stereo_residuals, ControlMeasure, ControlNetwork, ControlPoint, ResidualSummary,
    StereoIntersection,
};

/// Errors surfaced by the facade.
#[derive(Debug, Error)]
pub enum DgCameraError {
    /// Metadata could not be read.
    #[error(transparent)]
    Meta(#[from] MetaError),
    /// Raw XML failure outside of a metadata read.
    #[error(transparent)]
    Xml(#[from] XmlError),
    /// The correction file is unreadable or malformed.
    #[error(transparent)]
    Adjust(#[from] AdjustError),
}

/// Everything read from disk for one camera.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraInputs {
    pub metadata: SensorMetadata,
    /// Identity when no correction file was given.
    pub adjustment: Adjustment,
}

/// Read the metadata at `xml` and, when given, the correction at `adjustments`.
pub fn load_camera_inputs(
    xml: impl AsRef<Path>,
    adjustments: Option<impl AsRef<Path>>,
    options: &ReadOptions,
) -> Result<CameraInputs, DgCameraError> {
    let metadata = dg_meta::read_xml(xml.as_ref(), options)?;
    let adjustment = match adjustments {
        Some(path) => {
            let adjustment = read_adjustments(path.as_ref())?;
            info!(path = %path.as_ref().display(), "applying camera adjustment");
            adjustment
        }
        None => Adjustment::default(),
    };
    Ok(CameraInputs {
        metadata,
        adjustment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_metadata_file_is_meta_error() {
        let err = load_camera_inputs(
            "/nonexistent/scene.xml",
            None::<&Path>,
            &ReadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DgCameraError::Meta(MetaError::Argument(_))));
    }

    #[test]
    fn errors_convert_into_facade() {
        let err: DgCameraError = AdjustError::Count(3).into();
        assert!(err.to_string().contains("found 3"));
        let err: DgCameraError = XmlError::Xml("bad".into()).into();
        assert!(matches!(err, DgCameraError::Xml(_)));
    }
}
