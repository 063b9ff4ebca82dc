// Core module with noise fields, hashes and the vertex layout
pub mod core;

// World module with terrain, chunks and streaming
pub mod world;

// Utils module with settings persistence
pub mod utils;

pub mod constants;

pub use constants::*;
pub use crate::core::{NoiseBank, NoiseField, TerrainVertex};
pub use utils::{DEFAULT_SETTINGS_FILE, SettingsError, WorldSettings, load_settings, save_settings};
pub use world::{
    ActiveChunks, AltitudeZone, Chunk, ChunkDecorations, ChunkKey, ChunkManager, FoamSegment,
    HeightmapSnapshot, InstanceBudget, Terrain, TerrainMesh, UpdateReport,
};
