//! World generation and streaming
//! Contains the height/density functions, chunk building, decoration
//! placement and the chunk manager.

pub mod budget;
pub mod chunk;
pub mod foam;
pub mod heightmap;
pub mod manager;
pub mod placement;
pub mod terrain;

// Re-export commonly used types
pub use budget::{InstanceBudget, Positioned};
pub use chunk::{Chunk, ChunkKey, TerrainMesh};
pub use foam::FoamSegment;
pub use heightmap::HeightmapSnapshot;
pub use manager::{ActiveChunks, ChunkManager, UpdateReport};
pub use placement::ChunkDecorations;
pub use terrain::{AltitudeZone, Terrain};
