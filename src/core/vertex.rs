use bytemuck::{Pod, Zeroable};

/// Terrain mesh vertex, laid out for direct upload as a vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    /// Chunk-local x/z, absolute height
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// World-space UVs so the ground texture tiles across chunks
    pub uv: [f32; 2],
    /// Low-frequency tree cover in [0, 1]; zero below the shoreline
    pub tree_density: f32,
    /// Dirt patch amount in [0, 1]
    pub dirt: f32,
}

impl TerrainVertex {
    pub const SIZE: usize = std::mem::size_of::<TerrainVertex>();
}
