use std::env;

use dg_meta::{read_xml, ReadOptions};
use tracing::info;

fn parse_args() -> (Option<String>, ReadOptions) {
    let mut path = None;
    let mut options = ReadOptions::default();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--permissive-indices" => options = ReadOptions::permissive(),
            _ => path = Some(arg),
        }
    }
    (path, options)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let (path, options) = parse_args();
    let Some(path) = path else {
        eprintln!("usage: read_metadata <scene.xml> [--permissive-indices]");
        return Ok(());
    };

    let document = dg_xml::load_document(&path)?;
    let blocks: Vec<&str> = document.root().children().map(|c| c.name()).collect();
    info!(root = document.root().name(), ?blocks, "top-level blocks");

    let meta = read_xml(&path, &options)?;
    let size = meta.image.image_size();
    println!("{} {}x{} TDI {}", meta.image.sat_id, size.x, size.y, meta.image.tdi);
    println!(
        "{:<10} {:>8} {:>10}",
        "block", "samples", "interval"
    );
    println!(
        "{:<10} {:>8} {:>10}",
        "EPH",
        meta.ephemeris.len(),
        meta.ephemeris.time_interval
    );
    println!(
        "{:<10} {:>8} {:>10}",
        "ATT",
        meta.attitude.len(),
        meta.attitude.time_interval
    );
    let pc = meta.geometric.perspective_center;
    println!("perspective center {:.4} {:.4} {:.4}", pc.x, pc.y, pc.z);
    let offset = meta.rpc.xy_offset();
    println!(
        "RPC offset {} {} on {}",
        offset.x,
        offset.y,
        meta.rpc.datum()
    );
    Ok(())
}
