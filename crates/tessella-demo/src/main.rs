//! Demo binary that tiles a synthetic city into an implicit quadtree and
//! meshes the content of every tile on a worker pool.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p tessella-demo -- --max-level 3 --outline true`.

mod city;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use glam::DVec3;
use serde::Serialize;
use tessella_config::{CliArgs, Config, default_config_dir};
use tessella_mesh::{
    CoordinateTransform, Feature, MeshOptions, MeshStats, MeshingPipeline, MeshingResult, MeshingTask,
};
use tessella_tiling::{BoundingBox, TileAddress, TileKind, Tileset, spatial_filter};
use tracing::{debug, error, info, warn};

use crate::city::Building;

const COLLECTION: &str = "buildings";
const BUILDING_COUNT: usize = 2_000;
const SUMMARY_FILE: &str = "tileset-summary.json";

/// Mean earth radius in meters, for the local tangent-plane approximation.
const EARTH_RADIUS: f64 = 6_371_008.8;

#[derive(Debug, Default, Serialize)]
struct TileSummary {
    tile: String,
    path: String,
    features: usize,
    triangles: usize,
    vertices: usize,
    skipped_polygons: usize,
    geometric_error: f64,
}

#[derive(Debug, Default, Serialize)]
struct TilesetSummary {
    collection: String,
    subtrees: usize,
    tiles: Vec<TileSummary>,
    skipped_polygons: usize,
    triangles: usize,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from(".tessella"));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    tessella_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config, &config_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, config_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let extent = BoundingBox::from_array([7.0, 50.0, 0.0, 7.64, 50.32, 400.0]);
    let tileset = Tileset::new(COLLECTION, Some(extent), config.tileset.clone())?;
    if !config.tileset.content_filters.is_empty() {
        warn!("content filters are passed to the feature store only; the demo selects spatially");
    }

    let buildings = city::generate(&extent, BUILDING_COUNT, 97, 42);
    info!("Generated {} buildings", buildings.len());

    let subtrees = tileset.subtree_roots().count();
    info!(
        "Subtree roots at levels {:?}: {subtrees} subtrees",
        tileset.subtree_root_levels()
    );

    let workers = match config.pipeline.workers {
        0 => num_cpus::get(),
        n => n,
    };
    let options = MeshOptions {
        with_normals: config.mesh.with_normals,
        with_outline: config.mesh.with_outline,
        start_index: 0,
        clamp_to_ellipsoid: config.tileset.clamp_to_ellipsoid,
    };
    let origin = extent.center();
    let to_local = move |positions: &mut [DVec3]| {
        for p in positions.iter_mut() {
            *p = local_meters(*p, origin);
        }
    };
    let transform: Arc<dyn CoordinateTransform> = Arc::new(to_local);
    let mut pipeline =
        MeshingPipeline::new(workers, config.pipeline.budget, options, Some(transform))?;

    let mut summary = TilesetSummary {
        collection: COLLECTION.to_string(),
        subtrees,
        ..TilesetSummary::default()
    };

    let levels = config.tileset.content_levels;
    for level in levels.min..=levels.max {
        let side = 1u32 << level;
        for x in 0..side {
            for y in 0..side {
                let tile = tileset.address(TileKind::Content, level, x, y)?;
                let features = select(&tileset, &tile, &buildings);
                if features.is_empty() {
                    continue;
                }
                debug!(
                    "{tile}: {} features, query {}",
                    features.len(),
                    tileset.content_query(&tile).filter
                );
                let mut task = MeshingTask {
                    key: tile,
                    features,
                };
                // Wait for a worker whenever the budget is exhausted.
                while let Err(rejected) = pipeline.submit(task) {
                    task = rejected;
                    match pipeline.recv_result() {
                        Some(result) => record(&tileset, &mut summary, result),
                        None => std::thread::yield_now(),
                    }
                }
            }
        }
    }
    while let Some(result) = pipeline.recv_result() {
        record(&tileset, &mut summary, result);
    }
    pipeline.shutdown();

    summary.tiles.sort_by(|a, b| a.path.cmp(&b.path));
    let assigned: usize = summary.tiles.iter().map(|t| t.features).sum();
    let level_count = levels.len().max(1);
    info!(
        "Meshed {} tiles: {} triangles, {} polygons skipped, {} features over {} levels",
        summary.tiles.len(),
        summary.triangles,
        summary.skipped_polygons,
        assigned,
        level_count
    );
    if assigned != buildings.len() * levels.len() {
        warn!(
            "{} feature assignments, expected {}",
            assigned,
            buildings.len() * levels.len()
        );
    }

    write_summary(&summary, &config_dir.join("output"))?;
    Ok(())
}

/// Features of a content tile: those the tile's spatial filter selects.
fn select(tileset: &Tileset, tile: &TileAddress, buildings: &[Building]) -> Vec<Feature> {
    let filter = spatial_filter(
        tileset.config().primary_geometry.as_deref(),
        tileset.bbox(tile).to_rect(),
        tileset.exclusion(tile),
    );
    buildings
        .iter()
        .filter(|b| filter.matches(&b.footprint).unwrap_or(false))
        .map(|b| b.feature.clone())
        .collect()
}

fn record(
    tileset: &Tileset,
    summary: &mut TilesetSummary,
    result: MeshingResult<TileAddress>,
) {
    let MeshStats {
        features,
        polygons_skipped,
        triangles,
        ..
    } = result.stats;
    debug!(
        "{}: {} triangles, {} vertices",
        result.key,
        result.mesh.triangle_count(),
        result.mesh.vertex_count()
    );
    summary.triangles += triangles;
    summary.skipped_polygons += polygons_skipped;
    summary.tiles.push(TileSummary {
        tile: result.key.short(),
        path: result.key.relative_path(),
        features,
        triangles,
        vertices: result.mesh.vertex_count(),
        skipped_polygons: polygons_skipped,
        geometric_error: tileset.geometric_error(result.key.level()),
    });
}

/// Longitude/latitude/height to meters east/north/up of `origin`.
fn local_meters(p: DVec3, origin: DVec3) -> DVec3 {
    let lat = origin.y.to_radians();
    DVec3::new(
        (p.x - origin.x).to_radians() * EARTH_RADIUS * lat.cos(),
        (p.y - origin.y).to_radians() * EARTH_RADIUS,
        p.z,
    )
}

fn write_summary(summary: &TilesetSummary, dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&path, json)?;
    info!("Wrote {}", path.display());
    Ok(())
}
