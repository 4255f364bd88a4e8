//! Position and pose corrections produced by bundle adjustment.
//!
//! The file holds two lines: `x y z` of the position correction, then
//! `w x y z` of the rotation correction.

use std::fs;
use std::path::Path;

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use thiserror::Error;
use tracing::debug;

const VALUE_COUNT: usize = 7;

/// Errors produced while reading or writing adjustment files.
#[derive(Debug, Error)]
pub enum AdjustError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid number {token:?}: {reason}")]
    Parse { token: String, reason: String },
    #[error("expected {VALUE_COUNT} values (x y z, w x y z), found {0}")]
    Count(usize),
    #[error("rotation correction has zero norm")]
    ZeroRotation,
}

/// A position and rotation correction for one camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Adjustment {
    fn default() -> Self {
        Adjustment {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

impl Adjustment {
    pub fn new(position: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Adjustment { position, rotation }
    }

    /// Parse the textual form; any whitespace layout of seven numbers is accepted.
    pub fn parse(text: &str) -> Result<Self, AdjustError> {
        let values = text
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|err| AdjustError::Parse {
                    token: token.to_string(),
                    reason: err.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let [x, y, z, qw, qx, qy, qz]: [f64; VALUE_COUNT] = values
            .as_slice()
            .try_into()
            .map_err(|_| AdjustError::Count(values.len()))?;
        let rotation = UnitQuaternion::try_new(Quaternion::new(qw, qx, qy, qz), f64::EPSILON)
            .ok_or(AdjustError::ZeroRotation)?;
        Ok(Adjustment {
            position: Vector3::new(x, y, z),
            rotation,
        })
    }

    /// Textual form read back by [`Adjustment::parse`].
    pub fn to_text(&self) -> String {
        let q = self.rotation.quaternion();
        format!(
            "{} {} {}\n{} {} {} {}\n",
            self.position.x, self.position.y, self.position.z, q.w, q.i, q.j, q.k
        )
    }
}

/// Read the corrections stored at `path`.
pub fn read_adjustments(path: impl AsRef<Path>) -> Result<Adjustment, AdjustError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let adjustment = Adjustment::parse(&text)?;
    debug!(path = %path.display(), position = ?adjustment.position, "read adjustments");
    Ok(adjustment)
}

/// Write a position and rotation correction to `path`.
pub fn write_adjustments(
    path: impl AsRef<Path>,
    position: &Vector3<f64>,
    rotation: &UnitQuaternion<f64>,
) -> Result<(), AdjustError> {
    let path = path.as_ref();
    fs::write(path, Adjustment::new(*position, *rotation).to_text())?;
    debug!(path = %path.display(), "wrote adjustments");
    Ok(())
}
