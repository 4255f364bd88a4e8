use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dgctl::cmd_adjust;
use dgctl::cmd_inspect;
use dgctl::cmd_rpc;
use dgctl::cmd_size;
use dgctl::common::parse_numbers;

#[derive(Parser, Debug)]
#[command(name = "dgctl", version, about = "Push-broom sensor metadata CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    /// Accept duplicate or missing ephemeris/attitude labels
    #[arg(long)]
    permissive_indices: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Read every block of a metadata file and summarise it
    Inspect {
        #[arg(long)]
        xml: PathBuf,
        /// Bundle-adjustment correction to report alongside
        #[arg(long)]
        adjustments: Option<PathBuf>,
    },
    /// Print the RPC model (RPB or Rational_Function_Model layout)
    Rpc {
        #[arg(long)]
        xml: PathBuf,
    },
    /// Print the image size as `columns rows`
    Size {
        #[arg(long)]
        xml: PathBuf,
    },
    /// Read or write bundle-adjustment corrections
    Adjust {
        #[command(subcommand)]
        action: AdjustCmd,
    },
}

#[derive(Subcommand, Debug)]
enum AdjustCmd {
    /// Print the correction stored in a file
    Show {
        #[arg(long)]
        file: PathBuf,
    },
    /// Write a correction file
    Write {
        #[arg(long)]
        file: PathBuf,
        /// Position correction `x,y,z`
        #[arg(long, allow_hyphen_values = true, value_parser = parse_numbers::<3>)]
        position: [f64; 3],
        /// Rotation correction `w,x,y,z`
        #[arg(long, allow_hyphen_values = true, value_parser = parse_numbers::<4>)]
        rotation: [f64; 4],
    },
}

fn main() -> Result<()> {
    let Cli {
        verbose,
        json,
        permissive_indices,
        cmd,
    } = Cli::parse();

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .init();

    match cmd {
        Cmd::Inspect { xml, adjustments } => {
            cmd_inspect::run(xml, adjustments, permissive_indices, json)?
        }
        Cmd::Rpc { xml } => cmd_rpc::run(xml, json)?,
        Cmd::Size { xml } => cmd_size::run(xml, permissive_indices, json)?,
        Cmd::Adjust { action } => match action {
            AdjustCmd::Show { file } => cmd_adjust::show(file, json)?,
            AdjustCmd::Write {
                file,
                position,
                rotation,
            } => cmd_adjust::write(file, position, rotation)?,
        },
    };

    Ok(())
}
