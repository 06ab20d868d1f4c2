mod config;
mod error;
mod pipeline;

use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use glob::glob;
use log::LevelFilter;

use coordinate_transformer::EpsgCode;
use pcd_parser::parsers::extension_of;

use crate::config::PipelineOptions;
use crate::error::PipelineError;
use crate::pipeline::{run, PipelineInput};

#[derive(Parser, Debug)]
#[command(
    name = "Canopy Mapper",
    about = "Builds terrain grids and tree crowns from lidar point clouds",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
    input: Vec<String>,

    #[arg(short, long, required = true, value_name = "DIR")]
    output: String,

    /// Projected CRS of the input points
    #[arg(short, long, required = true)]
    epsg: EpsgCode,

    /// Cell pitch in meters
    #[arg(long, default_value_t = 2.0)]
    scale: f64,

    /// Cell pitch of the coarse background grid in meters
    #[arg(long)]
    background_scale: Option<f64>,

    /// Annotation image painted over the heightmap
    #[arg(long, value_name = "FILE")]
    mask: Option<PathBuf>,

    /// JSON options file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Multiplier from the input linear unit to meters
    #[arg(long, default_value_t = 1.0)]
    unit_scale: f64,
}

fn check_extensions(paths: &[PathBuf]) -> Result<(), PipelineError> {
    for path in paths {
        extension_of(path).map_err(|e| PipelineError::Input(e.to_string()))?;
    }
    Ok(())
}

fn expand_globs(input_patterns: Vec<String>) -> Result<Vec<PathBuf>, PipelineError> {
    let mut paths = Vec::new();
    for pattern in input_patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let entries = glob(&pattern).map_err(|e| PipelineError::Input(format!("{}: {}", pattern, e)))?;
            for entry in entries {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => log::warn!("skipping unreadable path: {:?}", e),
                }
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

fn execute(args: Cli) -> Result<(), PipelineError> {
    let options = match &args.config {
        Some(path) => PipelineOptions::load(path)?,
        None => PipelineOptions::default(),
    };
    log::info!("options: {:?}", options);

    let files = expand_globs(args.input)?;
    log::info!("Expanded input files: {:?}", files);
    check_extensions(&files)?;

    let input = PipelineInput {
        files,
        output: PathBuf::from(args.output),
        epsg: args.epsg,
        scale: args.scale,
        background_scale: args.background_scale,
        mask: args.mask,
        unit_scale: args.unit_scale,
    };
    let summary = run(&input, &options)?;
    log::info!(
        "{} points, {}x{} cells, {} trees",
        summary.points,
        summary.rows,
        summary.cols,
        summary.trees
    );
    Ok(())
}

fn main() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();

    let args = Cli::parse();

    log::info!("input files: {:?}", args.input);
    log::info!("output folder: {}", args.output);
    log::info!("input EPSG: {}", args.epsg);
    log::info!("cell scale: {}", args.scale);

    let start = std::time::Instant::now();
    log::info!("start processing...");

    if let Err(e) = execute(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }

    log::info!("Elapsed: {:?}", start.elapsed());
    log::info!("Finish processing");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["canopy-mapper", "-i", "a.las", "b.las", "-o", "out", "-e", "6677"]);
        assert_eq!(cli.input, vec!["a.las", "b.las"]);
        assert_eq!(cli.epsg, 6677);
        assert_eq!(cli.scale, 2.0);
        assert_eq!(cli.unit_scale, 1.0);
        assert!(cli.background_scale.is_none());
        assert!(cli.mask.is_none());
    }

    #[test]
    fn plain_paths_pass_through_globbing() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.csv", "b.csv", "c.txt"] {
            std::fs::write(dir.path().join(name), "x,y,z\n").unwrap();
        }
        let pattern = format!("{}/*.csv", dir.path().display());
        let mut paths = expand_globs(vec![pattern, "literal.las".to_string()]).unwrap();
        paths.sort();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().any(|p| p.ends_with("literal.las")));
        assert!(check_extensions(&paths).is_ok());
        assert!(check_extensions(&[PathBuf::from("points.ply")]).is_err());
    }
}
