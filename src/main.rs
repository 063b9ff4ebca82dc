//! Forest world streaming driver
//!
//! Walks a simulated observer across the world, streams chunks around it
//! and reports what the decoration consumers would receive.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use tracing::info;

use forestgen::world::placement::{RockPlacement, TreePlacement, VegetationPlacement};
use forestgen::{
    ChunkManager, HeightmapSnapshot, InstanceBudget, Terrain, WorldSettings, load_settings,
    save_settings,
};

const FRAME_DT: f32 = 1.0 / 60.0;
const TREE_CAPACITY: usize = 12_000;
const VEGETATION_CAPACITY: usize = 60_000;
const ROCK_CAPACITY: usize = 4_000;
const MINIMAP_RESOLUTION: usize = 64;
const MINIMAP_EXTENT: f32 = 256.0;
const MINIMAP_REFRESH: f32 = 16.0;

/// Procedural forest world streamer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// World seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u32>,

    /// Settings file to load instead of the defaults
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Observer speed in metres per second
    #[arg(long, default_value_t = 8.0)]
    speed: f32,

    /// Walking direction in degrees, 0 = +x
    #[arg(long, default_value_t = 30.0)]
    heading: f32,

    /// Write the effective settings to this file and exit
    #[arg(long)]
    dump_settings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => load_settings(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => WorldSettings::default(),
    };
    if let Some(seed) = args.seed {
        settings.terrain.seed = seed;
    }
    settings.validate().context("invalid world settings")?;

    if let Some(path) = &args.dump_settings {
        save_settings(path, &settings)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;
        return Ok(());
    }

    run(Arc::new(Terrain::new(settings)), &args);
    Ok(())
}

fn run(terrain: Arc<Terrain>, args: &Args) {
    info!("Streaming world with seed {}", terrain.seed());

    let mut manager = ChunkManager::new(terrain.clone());
    let changed = Rc::new(Cell::new(false));
    let notifications = Rc::new(Cell::new(0u32));
    {
        let (changed, notifications) = (changed.clone(), notifications.clone());
        manager.set_listener(move |_chunks| {
            changed.set(true);
            notifications.set(notifications.get() + 1);
        });
    }

    let mut trees: InstanceBudget<TreePlacement> = InstanceBudget::new("tree", TREE_CAPACITY);
    let mut plants: InstanceBudget<VegetationPlacement> =
        InstanceBudget::new("vegetation", VEGETATION_CAPACITY);
    let mut rocks: InstanceBudget<RockPlacement> = InstanceBudget::new("rock", ROCK_CAPACITY);
    let mut minimap = HeightmapSnapshot::new(MINIMAP_RESOLUTION, MINIMAP_EXTENT, MINIMAP_REFRESH);

    let heading = args.heading.to_radians();
    let direction = Vec2::new(heading.cos(), heading.sin());
    let mut observer = Vec2::ZERO;

    manager.force_load_all(observer.x, observer.y);

    let mut total_loaded = 0;
    let mut total_attached = 0;
    let mut total_unloaded = 0;
    let mut crossings = 0;
    let mut minimap_refreshes = 0;

    for frame in 0..args.frames {
        if frame > 0 {
            observer += direction * args.speed * FRAME_DT;
        }
        let report = manager.update(observer.x, observer.y);
        total_loaded += report.loaded;
        total_attached += report.attached;
        total_unloaded += report.unloaded;
        if report.crossed {
            crossings += 1;
            let height = terrain.terrain_height(observer.x, observer.y);
            info!(
                "Frame {}: observer at ({:.1}, {:.1}) height {:.2} zone {:?}, {} pending",
                frame,
                observer.x,
                observer.y,
                height,
                terrain.altitude_zone(height),
                report.pending
            );
        }

        if changed.replace(false) {
            trees.rebuild(
                manager.active_chunks().flat_map(|c| c.decorations.trees.iter()),
                observer,
            );
            plants.rebuild(
                manager.active_chunks().flat_map(|c| c.decorations.vegetation.iter()),
                observer,
            );
            rocks.rebuild(
                manager.active_chunks().flat_map(|c| c.decorations.rocks.iter()),
                observer,
            );
        }

        if minimap.refresh(&terrain, observer.x, observer.y) {
            minimap_refreshes += 1;
        }
    }

    let decorations: usize = manager.active_chunks().map(|c| c.decorations.total()).sum();
    let foam: usize = manager.active_chunks().map(|c| c.decorations.foam.len()).sum();
    let cottages: usize = manager.active_chunks().map(|c| c.decorations.cottages.len()).sum();
    info!(
        "Walked {:.0} m over {} frames: {} crossings, {} loaded ({} new meshes), {} unloaded",
        observer.length(),
        args.frames,
        crossings,
        total_loaded,
        total_attached,
        total_unloaded
    );
    info!(
        "{} active chunks, {} pooled, {} pending, {} change notifications",
        manager.active_count(),
        manager.pooled_count(),
        manager.pending_count(),
        notifications.get()
    );
    info!(
        "{} decorations ({} cottages, {} foam segments); instanced {} trees, {} plants, {} rocks",
        decorations,
        cottages,
        foam,
        trees.len(),
        plants.len(),
        rocks.len()
    );
    info!("Minimap resampled {} times", minimap_refreshes);

    manager.dispose();
}
