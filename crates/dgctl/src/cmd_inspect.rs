use std::path::PathBuf;

use anyhow::{Context, Result};
use dg_camera::{load_camera_inputs, CameraInputs};
use serde::Serialize;
use tracing::info;

use crate::common::{self, vec2, vec3};

#[derive(Serialize)]
struct InspectReport<'a> {
    satellite: &'a str,
    scan_direction: &'a str,
    columns: u32,
    rows: u32,
    tdi: i32,
    tlc_entries: usize,
    first_line_start_time: &'a str,
    ephemeris_samples: usize,
    ephemeris_start: &'a str,
    attitude_samples: usize,
    attitude_start: &'a str,
    principal_distance_mm: f64,
    detector_origin_mm: [f64; 2],
    detector_pixel_pitch_mm: f64,
    perspective_center_m: [f64; 3],
    datum: &'static str,
    adjustment_position: [f64; 3],
}

impl<'a> InspectReport<'a> {
    fn new(inputs: &'a CameraInputs) -> Self {
        let meta = &inputs.metadata;
        InspectReport {
            satellite: &meta.image.sat_id,
            scan_direction: &meta.image.scan_direction,
            columns: meta.image.columns,
            rows: meta.image.rows,
            tdi: meta.image.tdi,
            tlc_entries: meta.image.tlc.len(),
            first_line_start_time: &meta.image.first_line_start_time,
            ephemeris_samples: meta.ephemeris.len(),
            ephemeris_start: &meta.ephemeris.start_time,
            attitude_samples: meta.attitude.len(),
            attitude_start: &meta.attitude.start_time,
            principal_distance_mm: meta.geometric.principal_distance,
            detector_origin_mm: vec2(&meta.geometric.detector_origin),
            detector_pixel_pitch_mm: meta.geometric.detector_pixel_pitch,
            perspective_center_m: vec3(&meta.geometric.perspective_center),
            datum: meta.rpc.datum().name(),
            adjustment_position: vec3(&inputs.adjustment.position),
        }
    }
}

pub fn run(
    xml: PathBuf,
    adjustments: Option<PathBuf>,
    permissive_indices: bool,
    json: bool,
) -> Result<()> {
    let options = common::read_options(permissive_indices);
    info!(path = %xml.display(), "reading sensor metadata");
    let inputs = load_camera_inputs(&xml, adjustments.as_ref(), &options)
        .with_context(|| format!("read {}", xml.display()))?;
    let report = InspectReport::new(&inputs);

    if json {
        common::print_json(&report)?;
    } else {
        println!("satellite      {} ({})", report.satellite, report.scan_direction);
        println!("image size     {} x {}", report.columns, report.rows);
        println!("TDI            {}", report.tdi);
        println!("TLC entries    {}", report.tlc_entries);
        println!("first line     {}", report.first_line_start_time);
        println!(
            "ephemeris      {} samples from {}",
            report.ephemeris_samples, report.ephemeris_start
        );
        println!(
            "attitude       {} samples from {}",
            report.attitude_samples, report.attitude_start
        );
        println!("focal length   {} mm", report.principal_distance_mm);
        println!(
            "detector       origin {:?} mm, pitch {} mm",
            report.detector_origin_mm, report.detector_pixel_pitch_mm
        );
        println!("datum          {}", report.datum);
        if adjustments.is_some() {
            println!("adjustment     {:?}", report.adjustment_position);
        }
    }

    Ok(())
}
