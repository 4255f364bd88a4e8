use std::path::PathBuf;

use anyhow::{Context, Result};
use dg_camera::meta::{read_rpc_file, RpcModel};
use serde::Serialize;

use crate::common::{self, vec2, vec3};

#[derive(Serialize)]
struct RpcReport {
    datum: &'static str,
    semi_major_axis: f64,
    semi_minor_axis: f64,
    xy_offset: [f64; 2],
    xy_scale: [f64; 2],
    geodetic_offset: [f64; 3],
    geodetic_scale: [f64; 3],
    line_num: Vec<f64>,
    line_den: Vec<f64>,
    samp_num: Vec<f64>,
    samp_den: Vec<f64>,
}

impl From<&RpcModel> for RpcReport {
    fn from(model: &RpcModel) -> Self {
        let datum = model.datum();
        RpcReport {
            datum: datum.name(),
            semi_major_axis: datum.semi_major_axis(),
            semi_minor_axis: datum.semi_minor_axis(),
            xy_offset: vec2(&model.xy_offset()),
            xy_scale: vec2(&model.xy_scale()),
            geodetic_offset: vec3(&model.geodetic_offset()),
            geodetic_scale: vec3(&model.geodetic_scale()),
            line_num: model.line_num_coeff().iter().copied().collect(),
            line_den: model.line_den_coeff().iter().copied().collect(),
            samp_num: model.samp_num_coeff().iter().copied().collect(),
            samp_den: model.samp_den_coeff().iter().copied().collect(),
        }
    }
}

pub fn run(xml: PathBuf, json: bool) -> Result<()> {
    let model =
        read_rpc_file(&xml).with_context(|| format!("read RPC model from {}", xml.display()))?;
    let report = RpcReport::from(&model);

    if json {
        common::print_json(&report)?;
    } else {
        println!("datum            {}", model.datum());
        println!("pixel offset     {:?}", report.xy_offset);
        println!("pixel scale      {:?}", report.xy_scale);
        println!("lon/lat/h offset {:?}", report.geodetic_offset);
        println!("lon/lat/h scale  {:?}", report.geodetic_scale);
        for (name, coeffs) in [
            ("LINE_NUM", &report.line_num),
            ("LINE_DEN", &report.line_den),
            ("SAMP_NUM", &report.samp_num),
            ("SAMP_DEN", &report.samp_den),
        ] {
            let joined: Vec<String> = coeffs.iter().map(f64::to_string).collect();
            println!("{name:<16} {}", joined.join(" "));
        }
    }

    Ok(())
}
