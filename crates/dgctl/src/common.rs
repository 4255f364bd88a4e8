use anyhow::{Context, Result};
use dg_camera::meta::{IndexPolicy, ReadOptions};
use nalgebra::{Vector2, Vector3};
use serde::Serialize;

pub fn read_options(permissive_indices: bool) -> ReadOptions {
    ReadOptions {
        index_policy: if permissive_indices {
            IndexPolicy::Permissive
        } else {
            IndexPolicy::Strict
        },
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}

/// Parse `N` comma separated numbers, e.g. `1,-2.5,3`.
pub fn parse_numbers<const N: usize>(text: &str) -> std::result::Result<[f64; N], String> {
    let values = text
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|err| format!("invalid number {part:?}: {err}"))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    values
        .as_slice()
        .try_into()
        .map_err(|_| format!("expected {N} comma separated values, got {}", values.len()))
}

pub fn vec2(v: &Vector2<f64>) -> [f64; 2] {
    [v.x, v.y]
}

pub fn vec3(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}
