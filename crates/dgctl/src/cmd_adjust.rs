use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use dg_camera::{read_adjustments, write_adjustments, Adjustment};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::Serialize;
use tracing::info;

use crate::common::{self, vec3};

#[derive(Serialize)]
struct AdjustmentReport {
    position: [f64; 3],
    /// `w x y z`
    rotation: [f64; 4],
    rotation_angle_deg: f64,
}

impl From<&Adjustment> for AdjustmentReport {
    fn from(adjustment: &Adjustment) -> Self {
        let q = adjustment.rotation.quaternion();
        AdjustmentReport {
            position: vec3(&adjustment.position),
            rotation: [q.w, q.i, q.j, q.k],
            rotation_angle_deg: adjustment.rotation.angle().to_degrees(),
        }
    }
}

pub fn show(file: PathBuf, json: bool) -> Result<()> {
    let adjustment =
        read_adjustments(&file).with_context(|| format!("read {}", file.display()))?;
    let report = AdjustmentReport::from(&adjustment);

    if json {
        common::print_json(&report)?;
    } else {
        println!("position  {:?}", report.position);
        println!("rotation  {:?}", report.rotation);
        println!("angle     {} deg", report.rotation_angle_deg);
    }

    Ok(())
}

pub fn write(file: PathBuf, position: [f64; 3], rotation: [f64; 4]) -> Result<()> {
    let [w, x, y, z] = rotation;
    let rotation = UnitQuaternion::try_new(Quaternion::new(w, x, y, z), f64::EPSILON)
        .ok_or_else(|| anyhow!("rotation {rotation:?} has zero norm"))?;
    let position = Vector3::from(position);
    write_adjustments(&file, &position, &rotation)
        .with_context(|| format!("write {}", file.display()))?;
    info!(path = %file.display(), "wrote adjustment");
    Ok(())
}
