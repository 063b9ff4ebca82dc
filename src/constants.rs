// Streaming constants
pub const CHUNK_SIZE: f32 = 32.0;
pub const CHUNK_SEGMENTS: u32 = 63;
pub const LOAD_RADIUS: i32 = 5;
pub const UNLOAD_RADIUS: i32 = 7;
pub const MAX_CHUNKS_PER_FRAME: usize = 2;

// Base terrain noise
pub const TERRAIN_SEED: u32 = 42;
pub const TERRAIN_SCALE: f32 = 0.008;
pub const TERRAIN_OCTAVES: u32 = 4;
pub const TERRAIN_PERSISTENCE: f32 = 0.45;
pub const TERRAIN_LACUNARITY: f32 = 2.2;
pub const TERRAIN_HEIGHT: f32 = 8.0;

// Stream channels (ridge noise carving)
pub const STREAM_SCALE: f32 = 0.009;
pub const STREAM_DEPTH: f32 = 6.0;
pub const STREAM_WARP: f32 = 22.0;
pub const STREAM_WARP_SCALE: f32 = 0.006;
pub const STREAM_SHARPNESS: f32 = 2.0;
pub const STREAM_CARVE_FALLOFF: f32 = 0.8;

// Mountain chains (additive ridge noise)
pub const MOUNTAIN_SCALE: f32 = 0.003;
pub const MOUNTAIN_HEIGHT: f32 = 45.0;
pub const MOUNTAIN_WARP: f32 = 35.0;
pub const MOUNTAIN_WARP_SCALE: f32 = 0.0015;
pub const MOUNTAIN_SHARPNESS: f32 = 1.0;
pub const MOUNTAIN_THRESHOLD: f32 = 0.25;
pub const MOUNTAIN_DETAIL_SCALE: f32 = 0.01;
pub const MOUNTAIN_DETAIL_AMOUNT: f32 = 0.3;
pub const MOUNTAIN_AMP_SCALE: f32 = 0.0008;
pub const MOUNTAIN_VALLEY_DEPTH: f32 = 5.0;
pub const FOOTHILL_HEIGHT: f32 = 6.0;
pub const FOOTHILL_SCALE: f32 = 0.008;
pub const SPAWN_FLAT_RADIUS: f32 = 60.0;
pub const SPAWN_FADE_RADIUS: f32 = 100.0;

// Water and altitude zones
pub const WATER_LEVEL: f32 = -3.5;
pub const SHORE_LEVEL: f32 = -2.8;
pub const SUBALPINE_START: f32 = 10.0;
pub const TREELINE_START: f32 = 16.0;
pub const ALPINE_START: f32 = 20.0;
pub const SNOWLINE_START: f32 = 22.0;
pub const TREELINE_SCALE_MIN: f32 = 0.3;
pub const SLOPE_EPSILON: f32 = 0.5;
pub const SNOW_MAX_SLOPE: f32 = 1.2;
pub const GROUND_TEX_REPEAT: f32 = 6.0;
pub const GROUND_DIRT_SCALE: f32 = 0.03;

// Trees
pub const TREE_DENSITY_SCALE: f32 = 0.05;
pub const TREE_DENSITY_THRESHOLD: f32 = 0.15;
pub const TREE_GRID_SPACING: f32 = 3.0;
pub const TREE_JITTER: f32 = 1.2;
pub const TREE_MIN_HEIGHT: f32 = 2.5;
pub const TREE_MAX_HEIGHT: f32 = 6.0;
pub const TREE_TYPES: u32 = 3;
pub const TREE_MAX_SLOPE: f32 = 1.0;
pub const TREE_SINK: f32 = 0.15;

// Ground vegetation
pub const VEG_DENSITY_SCALE: f32 = 0.08;
pub const VEG_GRID_SPACING: f32 = 1.3;
pub const VEG_DENSITY_THRESHOLD: f32 = -0.15;
pub const VEG_JITTER: f32 = 0.5;
pub const VEG_FERN_THRESHOLD: f32 = 0.5;
pub const VEG_CLUSTER_RADIUS: f32 = 0.35;

// Flowers
pub const FLOWER_GRID_SPACING: f32 = 2.0;
pub const FLOWER_DENSITY_THRESHOLD: f32 = 0.55;
pub const FLOWER_JITTER: f32 = 0.8;
pub const FLOWER_SCALE: f32 = 0.55;
pub const FLOWER_COLORS: u32 = 6;

// Rocks
pub const ROCK_DENSITY_SCALE: f32 = 0.04;
pub const ROCK_GRID_SPACING: f32 = 5.0;
pub const ROCK_DENSITY_THRESHOLD: f32 = 0.45;
pub const ROCK_JITTER: f32 = 1.5;

// Collectibles
pub const COLLECTIBLE_DENSITY_SCALE: f32 = 0.03;
pub const COLLECTIBLE_GRID_SPACING: f32 = 12.0;
pub const COLLECTIBLE_DENSITY_THRESHOLD: f32 = 0.55;
pub const COLLECTIBLE_JITTER: f32 = 3.0;
pub const COLLECTIBLE_HOVER: f32 = 0.6;

// Fallen logs & stumps
pub const LOG_DENSITY_SCALE: f32 = 0.04;
pub const LOG_GRID_SPACING: f32 = 8.0;
pub const LOG_DENSITY_THRESHOLD: f32 = 0.55;
pub const LOG_JITTER: f32 = 2.0;
pub const LOG_MIN_LENGTH: f32 = 1.5;
pub const LOG_MAX_LENGTH: f32 = 4.0;

// Cottages
pub const COTTAGE_DENSITY_SCALE: f32 = 0.02;
pub const COTTAGE_GRID_SPACING: f32 = 16.0;
pub const COTTAGE_DENSITY_THRESHOLD: f32 = 0.45;
pub const COTTAGE_JITTER: f32 = 4.0;
pub const COTTAGE_CLEARING_RADIUS: f32 = 10.0;
pub const COTTAGE_MIN_TREE_DENSITY: f32 = 0.0;
pub const COTTAGE_MAX_SLOPE: f32 = 0.3;
pub const COTTAGE_FOOTPRINT_RADIUS: f32 = 3.0;
pub const COTTAGE_MAX_HEIGHT_RANGE: f32 = 1.0;
pub const COTTAGE_GARDEN_FLOWERS: u32 = 10;
pub const COTTAGE_GARDEN_RADIUS: f32 = 4.5;

// Shore foam
pub const FOAM_GRID_SPACING: f32 = 0.6;
