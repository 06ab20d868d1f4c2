use std::{path::PathBuf, sync::Arc, time::Instant};

use coordinate_transformer::{CoordinateEngine, EpsgCode, Projection, UtmProjection};
use pcd_canopy::detect_trees_with_progress;
use pcd_core::{
    grid::{mask::PaintMask, selection::Selection, Grid},
    pointcloud::{decimation::decimator::StrideDecimator, point::Origin},
    progress::{LogProgress, ProgressObserver, ThrottledProgress},
};
use pcd_exporter::{place_trees, write_bitcode, write_json, write_raw_grid, GridBundle};
use pcd_infill::{infill, load_mask, ChannelOrder, InfillOptions};
use pcd_parser::parsers::parse_files;
use pcd_rasterizer::{normalize_visual, rasterize, ClassFilter, RasterOptions, ValueSelector};

use crate::{config::PipelineOptions, error::PipelineError};

pub const BUNDLE_JSON: &str = "bundle.json";
pub const BUNDLE_BIN: &str = "bundle.bin";
pub const HEIGHTMAP_RAW: &str = "heightmap.raw";

/// Command line inputs of one run.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub files: Vec<PathBuf>,
    pub output: PathBuf,
    pub epsg: EpsgCode,
    pub scale: f64,
    pub background_scale: Option<f64>,
    pub mask: Option<PathBuf>,
    pub unit_scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub points: usize,
    pub rows: usize,
    pub cols: usize,
    pub trees: usize,
}

pub fn run(input: &PipelineInput, options: &PipelineOptions) -> Result<RunSummary, PipelineError> {
    if input.files.is_empty() {
        return Err(PipelineError::NoInput);
    }
    if !(input.scale.is_finite() && input.scale > 0.0) {
        return Err(PipelineError::Input(format!("cell scale must be positive, got {}", input.scale)));
    }
    let mut progress = ThrottledProgress::new(LogProgress);

    log::info!("start parsing...");
    let start_local = Instant::now();
    let batches = parse_files(&input.files, input.unit_scale).map_err(PipelineError::Parse)?;
    log::info!("finish parsing in {:?}", start_local.elapsed());

    log::info!("start loading points...");
    let start_local = Instant::now();
    let source: Arc<dyn Projection> = Arc::new(UtmProjection::from_epsg(input.epsg)?);
    let target: Arc<dyn Projection> = match options.target_epsg {
        Some(epsg) if epsg != input.epsg => Arc::new(UtmProjection::from_epsg(epsg)?),
        _ => source.clone(),
    };
    let mut engine = CoordinateEngine::with_projection(target.clone());
    for batch in batches {
        engine.add_batch(batch, source.clone())?;
    }
    let origin = engine.compute_origin()?;
    engine.remove_bias()?;
    log::info!(
        "{} points in {} anchored at ({:.3}, {:.3}) in {:?}",
        engine.count(),
        target.name(),
        origin.easting,
        origin.northing,
        start_local.elapsed()
    );

    log::info!("start rasterizing...");
    let start_local = Instant::now();
    let cloud = engine.cloud();
    let full = RasterOptions::default();
    let ground = rasterize(
        cloud,
        input.scale,
        ValueSelector::Elevation,
        &options.ground_filter,
        &full,
        &mut progress,
    )?;
    let object = rasterize(
        cloud,
        input.scale,
        ValueSelector::Elevation,
        &ClassFilter::All,
        &full,
        &mut progress,
    )?;
    let sparse = RasterOptions {
        sample_stride: StrideDecimator::for_density(cloud, input.scale).stride,
    };
    let intensity = rasterize(
        cloud,
        input.scale,
        ValueSelector::Intensity,
        &ClassFilter::All,
        &sparse,
        &mut progress,
    )?;
    log::info!(
        "finish rasterizing {}x{} cells in {:?}",
        ground.rows(),
        ground.cols(),
        start_local.elapsed()
    );

    let full_shape = ground.shape();
    let selection = options
        .selection
        .map(|s| s.clamp(full_shape.0, full_shape.1))
        .unwrap_or_else(|| Selection::full(full_shape.0, full_shape.1));
    if selection.is_empty() {
        return Err(PipelineError::Input(format!("selection {:?} is empty", selection)));
    }
    let ground = ground.crop(&selection);
    let object = object.crop(&selection);
    let visual = normalize_visual(&intensity.crop(&selection));
    let (offset_x, offset_y) = selection.lower_left_offset(input.scale);
    let grid_origin = engine.grid_origin()?;
    let grid_origin = Origin::new(grid_origin.easting + offset_x, grid_origin.northing + offset_y);

    // A mask painted over the whole store follows the selection; anything
    // else has to match the cropped grid already
    let mask = match &input.mask {
        Some(path) => {
            let mask = load_mask(path, ChannelOrder::default(), options.flip_mask_rows).map_err(PipelineError::Mask)?;
            if mask.shape() == full_shape && mask.shape() != ground.shape() {
                log::debug!("cropping {:?} mask to {:?}", mask.shape(), selection);
                Some(mask.crop(&selection))
            } else {
                Some(mask)
            }
        }
        None => None,
    };

    log::info!("start infilling...");
    let start_local = Instant::now();
    let ground_options = InfillOptions {
        background_ratio: input.background_scale.map(|b| b / input.scale),
        fill_preserved: options.fill_preserved,
        purge_preserved: options.purge_preserved,
    };
    let ground = infill(&ground, mask.as_ref(), &ground_options)?;
    let object = infill(&object, None, &InfillOptions::default())?.filled;
    log::info!("finish infilling in {:?}", start_local.elapsed());

    let trees = if options.lidar_trees {
        log::info!("start detecting trees...");
        let start_local = Instant::now();
        let trees = detect_trees(&ground.filled, &object, options, &mut progress)?;
        log::info!("finish detecting trees in {:?}", start_local.elapsed());
        trees
    } else {
        Vec::new()
    };
    let placements = place_trees_in_selection(&engine, &trees, input.scale, mask.as_ref(), (offset_x, offset_y));

    let mut builder = GridBundle::builder(&ground.filled, &visual, grid_origin, target.name());
    if let Some(background) = &ground.background {
        builder = builder.background(background);
    }
    let bundle = builder.trees(placements).build();

    std::fs::create_dir_all(&input.output)?;
    write_json(&bundle, &input.output.join(BUNDLE_JSON)).map_err(PipelineError::Export)?;
    write_bitcode(&bundle, &input.output.join(BUNDLE_BIN)).map_err(PipelineError::Export)?;
    write_raw_grid(&ground.filled, &input.output.join(HEIGHTMAP_RAW)).map_err(PipelineError::Export)?;

    Ok(RunSummary {
        points: engine.count(),
        rows: ground.filled.rows(),
        cols: ground.filled.cols(),
        trees: bundle.trees.len(),
    })
}

fn detect_trees(
    ground: &Grid,
    object: &Grid,
    options: &PipelineOptions,
    progress: &mut dyn ProgressObserver,
) -> Result<Vec<pcd_core::tree::DetectedTree>, PipelineError> {
    match detect_trees_with_progress(ground, object, &options.tree_detector, progress) {
        Ok(trees) => Ok(trees),
        Err(pcd_core::Error::EmptyInput(reason)) => {
            log::warn!("skipping tree detection: {}", reason);
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

// Trees are found on the cropped grid; destination space spans the whole store
fn place_trees_in_selection(
    engine: &CoordinateEngine,
    trees: &[pcd_core::tree::DetectedTree],
    scale: f64,
    mask: Option<&PaintMask>,
    (offset_x, offset_y): (f64, f64),
) -> Vec<pcd_exporter::TreePlacement> {
    let mut placements = place_trees(engine, trees, scale, mask);
    for p in &mut placements {
        p.x += offset_x;
        p.z += offset_y;
    }
    placements
}
