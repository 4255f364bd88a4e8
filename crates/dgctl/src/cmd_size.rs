use std::path::PathBuf;

use anyhow::{Context, Result};
use dg_camera::meta::read_xml;
use serde::Serialize;

use crate::common;

#[derive(Serialize)]
struct ImageSize {
    columns: u32,
    rows: u32,
}

pub fn run(xml: PathBuf, permissive_indices: bool, json: bool) -> Result<()> {
    let options = common::read_options(permissive_indices);
    let meta = read_xml(&xml, &options).with_context(|| format!("read {}", xml.display()))?;
    let size = meta.image.image_size();
    let payload = ImageSize {
        columns: size.x,
        rows: size.y,
    };

    if json {
        common::print_json(&payload)?;
    } else {
        println!("{} {}", payload.columns, payload.rows);
    }

    Ok(())
}
