//! Core building blocks shared by the generator
//! Contains the seeded noise fields, coordinate hashes and the mesh vertex.

pub mod hash;
pub mod noise;
pub mod vertex;

// Re-export commonly used types
pub use noise::{NoiseBank, NoiseField};
pub use vertex::TerrainVertex;
