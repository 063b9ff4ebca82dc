use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::constants::*;

const MAGIC_HEADER: &[u8; 4] = b"FGWS";
const VERSION: u32 = 1;

pub const SETTINGS_FILE_EXTENSION: &str = "fgs";
pub const DEFAULT_SETTINGS_FILE: &str = "world.fgs";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings encoding failed: {0}")]
    Encode(#[from] bincode::Error),
    #[error("not a settings file (bad magic header)")]
    BadMagic,
    #[error("unsupported settings version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Every tunable read by the generator and the chunk streamer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorldSettings {
    pub stream: StreamSettings,
    pub terrain: TerrainSettings,
    #[serde(default)]
    pub streams: StreamCarveSettings,
    #[serde(default)]
    pub mountains: MountainSettings,
    #[serde(default)]
    pub zones: ZoneSettings,
    #[serde(default)]
    pub trees: TreeSettings,
    #[serde(default)]
    pub vegetation: VegetationSettings,
    #[serde(default)]
    pub flowers: FlowerSettings,
    #[serde(default)]
    pub rocks: RockSettings,
    #[serde(default)]
    pub collectibles: CollectibleSettings,
    #[serde(default)]
    pub logs: LogSettings,
    #[serde(default)]
    pub cottages: CottageSettings,
    #[serde(default)]
    pub foam: FoamSettings,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            stream: StreamSettings::default(),
            terrain: TerrainSettings::default(),
            streams: StreamCarveSettings::default(),
            mountains: MountainSettings::default(),
            zones: ZoneSettings::default(),
            trees: TreeSettings::default(),
            vegetation: VegetationSettings::default(),
            flowers: FlowerSettings::default(),
            rocks: RockSettings::default(),
            collectibles: CollectibleSettings::default(),
            logs: LogSettings::default(),
            cottages: CottageSettings::default(),
            foam: FoamSettings::default(),
        }
    }
}

impl WorldSettings {
    pub fn with_seed(seed: u32) -> Self {
        let mut settings = Self::default();
        settings.terrain.seed = seed;
        settings
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let stream = &self.stream;
        if stream.chunk_size <= 0.0 {
            return invalid("chunk_size must be positive");
        }
        if stream.segments == 0 {
            return invalid("segments must be at least 1");
        }
        if stream.load_radius < 0 {
            return invalid("load_radius must not be negative");
        }
        if stream.unload_radius <= stream.load_radius {
            return invalid(format!(
                "unload_radius ({}) must exceed load_radius ({})",
                stream.unload_radius, stream.load_radius
            ));
        }
        if stream.max_chunks_per_frame == 0 {
            return invalid("max_chunks_per_frame must be at least 1");
        }
        if self.terrain.octaves == 0 {
            return invalid("terrain octaves must be at least 1");
        }
        if !(0.0..1.0).contains(&self.mountains.threshold) {
            return invalid("mountain threshold must lie in [0, 1)");
        }
        if self.mountains.spawn_fade_radius <= self.mountains.spawn_flat_radius {
            return invalid("spawn_fade_radius must exceed spawn_flat_radius");
        }
        if self.zones.slope_epsilon <= 0.0 {
            return invalid("slope_epsilon must be positive");
        }
        if self.foam.grid_spacing <= 0.0 {
            return invalid("foam grid_spacing must be positive");
        }
        if self.trees.types == 0 || self.flowers.colors == 0 {
            return invalid("tree types and flower colors must be non-zero");
        }

        let categories = [
            ("trees", &self.trees.placement),
            ("vegetation", &self.vegetation.placement),
            ("flowers", &self.flowers.placement),
            ("rocks", &self.rocks.placement),
            ("collectibles", &self.collectibles.placement),
            ("logs", &self.logs.placement),
            ("cottages", &self.cottages.placement),
        ];
        for (name, placement) in categories {
            if placement.grid_spacing <= 0.0 {
                return invalid(format!("{name} grid_spacing must be positive"));
            }
            if !(-1.0..=1.0).contains(&placement.density_threshold) {
                return invalid(format!("{name} density_threshold must lie in [-1, 1]"));
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> Result<(), SettingsError> {
    Err(SettingsError::Invalid(message.into()))
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StreamSettings {
    pub chunk_size: f32,
    pub segments: u32,
    pub load_radius: i32,
    pub unload_radius: i32,
    pub max_chunks_per_frame: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            segments: CHUNK_SEGMENTS,
            load_radius: LOAD_RADIUS,
            unload_radius: UNLOAD_RADIUS,
            max_chunks_per_frame: MAX_CHUNKS_PER_FRAME,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TerrainSettings {
    pub seed: u32,
    pub scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub height: f32,
    pub dirt_scale: f32,
    pub tex_repeat: f32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: TERRAIN_SEED,
            scale: TERRAIN_SCALE,
            octaves: TERRAIN_OCTAVES,
            persistence: TERRAIN_PERSISTENCE,
            lacunarity: TERRAIN_LACUNARITY,
            height: TERRAIN_HEIGHT,
            dirt_scale: GROUND_DIRT_SCALE,
            tex_repeat: GROUND_TEX_REPEAT,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StreamCarveSettings {
    pub scale: f32,
    pub depth: f32,
    pub warp: f32,
    pub warp_scale: f32,
    pub sharpness: f32,
    /// How strongly high ground resists carving (0 = carve everywhere).
    pub carve_falloff: f32,
}

impl Default for StreamCarveSettings {
    fn default() -> Self {
        Self {
            scale: STREAM_SCALE,
            depth: STREAM_DEPTH,
            warp: STREAM_WARP,
            warp_scale: STREAM_WARP_SCALE,
            sharpness: STREAM_SHARPNESS,
            carve_falloff: STREAM_CARVE_FALLOFF,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MountainSettings {
    pub scale: f32,
    pub height: f32,
    pub warp: f32,
    pub warp_scale: f32,
    pub sharpness: f32,
    pub threshold: f32,
    pub detail_scale: f32,
    pub detail_amount: f32,
    pub amplitude_scale: f32,
    pub valley_depth: f32,
    pub foothill_height: f32,
    pub foothill_scale: f32,
    pub spawn_flat_radius: f32,
    pub spawn_fade_radius: f32,
}

impl Default for MountainSettings {
    fn default() -> Self {
        Self {
            scale: MOUNTAIN_SCALE,
            height: MOUNTAIN_HEIGHT,
            warp: MOUNTAIN_WARP,
            warp_scale: MOUNTAIN_WARP_SCALE,
            sharpness: MOUNTAIN_SHARPNESS,
            threshold: MOUNTAIN_THRESHOLD,
            detail_scale: MOUNTAIN_DETAIL_SCALE,
            detail_amount: MOUNTAIN_DETAIL_AMOUNT,
            amplitude_scale: MOUNTAIN_AMP_SCALE,
            valley_depth: MOUNTAIN_VALLEY_DEPTH,
            foothill_height: FOOTHILL_HEIGHT,
            foothill_scale: FOOTHILL_SCALE,
            spawn_flat_radius: SPAWN_FLAT_RADIUS,
            spawn_fade_radius: SPAWN_FADE_RADIUS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ZoneSettings {
    pub water_level: f32,
    pub shore_level: f32,
    pub subalpine_start: f32,
    pub treeline_start: f32,
    pub alpine_start: f32,
    pub snowline_start: f32,
    pub treeline_scale_min: f32,
    pub slope_epsilon: f32,
    pub snow_max_slope: f32,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            water_level: WATER_LEVEL,
            shore_level: SHORE_LEVEL,
            subalpine_start: SUBALPINE_START,
            treeline_start: TREELINE_START,
            alpine_start: ALPINE_START,
            snowline_start: SNOWLINE_START,
            treeline_scale_min: TREELINE_SCALE_MIN,
            slope_epsilon: SLOPE_EPSILON,
            snow_max_slope: SNOW_MAX_SLOPE,
        }
    }
}

/// Sub-grid walk shared by every decoration category.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PlacementSettings {
    pub grid_spacing: f32,
    pub density_scale: f32,
    pub density_threshold: f32,
    pub jitter: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TreeSettings {
    pub placement: PlacementSettings,
    pub min_height: f32,
    pub max_height: f32,
    pub types: u32,
    pub max_slope: f32,
    pub sink: f32,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            placement: PlacementSettings {
                grid_spacing: TREE_GRID_SPACING,
                density_scale: TREE_DENSITY_SCALE,
                density_threshold: TREE_DENSITY_THRESHOLD,
                jitter: TREE_JITTER,
            },
            min_height: TREE_MIN_HEIGHT,
            max_height: TREE_MAX_HEIGHT,
            types: TREE_TYPES,
            max_slope: TREE_MAX_SLOPE,
            sink: TREE_SINK,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VegetationSettings {
    pub placement: PlacementSettings,
    pub fern_threshold: f32,
    pub cluster_radius: f32,
}

impl Default for VegetationSettings {
    fn default() -> Self {
        Self {
            placement: PlacementSettings {
                grid_spacing: VEG_GRID_SPACING,
                density_scale: VEG_DENSITY_SCALE,
                density_threshold: VEG_DENSITY_THRESHOLD,
                jitter: VEG_JITTER,
            },
            fern_threshold: VEG_FERN_THRESHOLD,
            cluster_radius: VEG_CLUSTER_RADIUS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FlowerSettings {
    pub placement: PlacementSettings,
    pub scale: f32,
    pub colors: u32,
}

impl Default for FlowerSettings {
    fn default() -> Self {
        Self {
            placement: PlacementSettings {
                grid_spacing: FLOWER_GRID_SPACING,
                density_scale: VEG_DENSITY_SCALE,
                density_threshold: FLOWER_DENSITY_THRESHOLD,
                jitter: FLOWER_JITTER,
            },
            scale: FLOWER_SCALE,
            colors: FLOWER_COLORS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RockSettings {
    pub placement: PlacementSettings,
}

impl Default for RockSettings {
    fn default() -> Self {
        Self {
            placement: PlacementSettings {
                grid_spacing: ROCK_GRID_SPACING,
                density_scale: ROCK_DENSITY_SCALE,
                density_threshold: ROCK_DENSITY_THRESHOLD,
                jitter: ROCK_JITTER,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CollectibleSettings {
    pub placement: PlacementSettings,
    pub hover: f32,
}

impl Default for CollectibleSettings {
    fn default() -> Self {
        Self {
            placement: PlacementSettings {
                grid_spacing: COLLECTIBLE_GRID_SPACING,
                density_scale: COLLECTIBLE_DENSITY_SCALE,
                density_threshold: COLLECTIBLE_DENSITY_THRESHOLD,
                jitter: COLLECTIBLE_JITTER,
            },
            hover: COLLECTIBLE_HOVER,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LogSettings {
    pub placement: PlacementSettings,
    pub min_length: f32,
    pub max_length: f32,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            placement: PlacementSettings {
                grid_spacing: LOG_GRID_SPACING,
                density_scale: LOG_DENSITY_SCALE,
                density_threshold: LOG_DENSITY_THRESHOLD,
                jitter: LOG_JITTER,
            },
            min_length: LOG_MIN_LENGTH,
            max_length: LOG_MAX_LENGTH,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CottageSettings {
    pub placement: PlacementSettings,
    pub clearing_radius: f32,
    pub min_tree_density: f32,
    pub max_slope: f32,
    pub footprint_radius: f32,
    pub max_height_range: f32,
    pub garden_flowers: u32,
    pub garden_radius: f32,
}

impl Default for CottageSettings {
    fn default() -> Self {
        Self {
            placement: PlacementSettings {
                grid_spacing: COTTAGE_GRID_SPACING,
                density_scale: COTTAGE_DENSITY_SCALE,
                density_threshold: COTTAGE_DENSITY_THRESHOLD,
                jitter: COTTAGE_JITTER,
            },
            clearing_radius: COTTAGE_CLEARING_RADIUS,
            min_tree_density: COTTAGE_MIN_TREE_DENSITY,
            max_slope: COTTAGE_MAX_SLOPE,
            footprint_radius: COTTAGE_FOOTPRINT_RADIUS,
            max_height_range: COTTAGE_MAX_HEIGHT_RANGE,
            garden_flowers: COTTAGE_GARDEN_FLOWERS,
            garden_radius: COTTAGE_GARDEN_RADIUS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FoamSettings {
    pub grid_spacing: f32,
}

impl Default for FoamSettings {
    fn default() -> Self {
        Self {
            grid_spacing: FOAM_GRID_SPACING,
        }
    }
}

pub fn save_settings<P: AsRef<Path>>(path: P, settings: &WorldSettings) -> Result<(), SettingsError> {
    settings.validate()?;

    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    writer.write_all(MAGIC_HEADER)?;
    writer.write_all(&VERSION.to_le_bytes())?;

    let data = bincode::serialize(settings)?;
    writer.write_all(&(data.len() as u64).to_le_bytes())?;
    writer.write_all(&data)?;
    writer.flush()?;

    tracing::info!(path = %path.as_ref().display(), "Saved world settings");
    Ok(())
}

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<WorldSettings, SettingsError> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC_HEADER {
        return Err(SettingsError::BadMagic);
    }

    let mut version_bytes = [0u8; 4];
    reader.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);
    if version != VERSION {
        return Err(SettingsError::UnsupportedVersion(version));
    }

    let mut size_bytes = [0u8; 8];
    reader.read_exact(&mut size_bytes)?;
    let size = u64::from_le_bytes(size_bytes);

    // Magic, version and length prefix
    let header_len = (MAGIC_HEADER.len() + 4 + 8) as u64;
    let remaining = reader.get_ref().metadata()?.len().saturating_sub(header_len);
    if size > remaining {
        return Err(SettingsError::Invalid(format!(
            "payload length {} exceeds the {} bytes left in the file",
            size, remaining
        )));
    }

    let mut data = vec![0u8; size as usize];
    reader.read_exact(&mut data)?;

    let settings: WorldSettings = bincode::deserialize(&data)?;
    settings.validate()?;

    tracing::info!(
        path = %path.as_ref().display(),
        seed = settings.terrain.seed,
        "Loaded world settings"
    );
    Ok(settings)
}
