use tracing::trace;

use crate::core::vertex::TerrainVertex;
use crate::world::foam::{extract_shoreline, may_have_shoreline};
use crate::world::placement::{ChunkDecorations, Scatter};
use crate::world::terrain::Terrain;

/// Integer chunk grid coordinates `(cx, cz)`.
pub type ChunkKey = (i32, i32);

/// World coordinate of lattice line `index` in chunk `chunk`.
///
/// Indices outside `0..segments` are folded into the neighbouring chunk
/// first, so a boundary vertex and a neighbour's normal sample evaluate
/// exactly the same float on both sides of a seam.
pub fn lattice_coord(chunk: i32, index: i32, size: f32, segments: i32) -> f32 {
    let chunk = chunk + index.div_euclid(segments);
    let index = index.rem_euclid(segments);
    chunk as f32 * size + size * index as f32 / segments as f32
}

/// Chunk containing a world coordinate along one axis.
pub fn chunk_coord(world: f32, size: f32) -> i32 {
    (world / size).floor() as i32
}

#[derive(Clone, Debug)]
pub struct TerrainMesh {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
    /// Row-major (z, x) heights of the `(segments + 1)²` lattice
    pub heights: Vec<f32>,
    pub vertices_per_side: usize,
    pub min_height: f32,
    pub max_height: f32,
    pub visible: bool,
}

impl TerrainMesh {
    fn new(segments: usize) -> Self {
        let side = segments + 1;
        TerrainMesh {
            vertices: vec![TerrainVertex::default(); side * side],
            indices: grid_indices(segments),
            heights: vec![0.0; side * side],
            vertices_per_side: side,
            min_height: 0.0,
            max_height: 0.0,
            visible: false,
        }
    }

    pub fn height_at(&self, ix: usize, iz: usize) -> f32 {
        self.heights[iz * self.vertices_per_side + ix]
    }

    pub fn vertex_at(&self, ix: usize, iz: usize) -> &TerrainVertex {
        &self.vertices[iz * self.vertices_per_side + ix]
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Two triangles per quad, flipping the diagonal in a checkerboard.
fn grid_indices(segments: usize) -> Vec<u32> {
    let side = (segments + 1) as u32;
    let mut indices = Vec::with_capacity(segments * segments * 6);
    for z in 0..segments as u32 {
        for x in 0..segments as u32 {
            let a = z * side + x;
            let b = a + 1;
            let c = a + side;
            let d = c + 1;
            if (x + z) % 2 == 0 {
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            } else {
                indices.extend_from_slice(&[a, c, d, a, d, b]);
            }
        }
    }
    indices
}

/// One streamed tile of terrain plus everything scattered on it.
#[derive(Debug, Default)]
pub struct Chunk {
    pub cx: i32,
    pub cz: i32,
    active: bool,
    attached: bool,
    mesh: Option<TerrainMesh>,
    pub decorations: ChunkDecorations,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> ChunkKey {
        (self.cx, self.cz)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the mesh has been handed to the scene at least once.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn mark_attached(&mut self) {
        self.attached = true;
    }

    pub fn mesh(&self) -> Option<&TerrainMesh> {
        self.mesh.as_ref()
    }

    pub fn origin(&self, size: f32) -> (f32, f32) {
        (self.cx as f32 * size, self.cz as f32 * size)
    }

    /// Fills geometry and decorations for chunk `(cx, cz)`, reusing buffers
    /// from a previous build when the resolution matches.
    pub fn build(&mut self, terrain: &Terrain, cx: i32, cz: i32) {
        self.cx = cx;
        self.cz = cz;

        let settings = terrain.settings();
        let size = settings.stream.chunk_size;
        let segments = settings.stream.segments.max(1) as usize;

        let reusable = self
            .mesh
            .as_ref()
            .is_some_and(|m| m.vertices_per_side == segments + 1);
        if !reusable {
            self.mesh = Some(TerrainMesh::new(segments));
        }
        let Some(mesh) = self.mesh.as_mut() else {
            return;
        };

        build_geometry(mesh, terrain, cx, cz, segments);
        mesh.visible = true;

        Scatter::new(terrain, cx, cz).populate(&mut self.decorations);
        if may_have_shoreline(terrain, mesh.min_height, mesh.max_height) {
            let (ox, oz) = (cx as f32 * size, cz as f32 * size);
            extract_shoreline(terrain, ox, oz, size, &mut self.decorations.foam);
        }

        self.active = true;
        trace!(
            "Built chunk ({}, {}): {} trees, {} plants, {} foam segments",
            cx,
            cz,
            self.decorations.trees.len(),
            self.decorations.vegetation.len(),
            self.decorations.foam.len()
        );
    }

    /// Hides the mesh and drops decorations; buffers stay for the next build.
    pub fn deactivate(&mut self) {
        self.active = false;
        if let Some(mesh) = self.mesh.as_mut() {
            mesh.visible = false;
        }
        self.decorations.clear();
    }

    /// Frees geometry for good.
    pub fn dispose(&mut self) {
        self.active = false;
        self.attached = false;
        self.mesh = None;
        self.decorations = ChunkDecorations::default();
    }
}

fn build_geometry(mesh: &mut TerrainMesh, terrain: &Terrain, cx: i32, cz: i32, segments: usize) {
    let settings = terrain.settings();
    let size = settings.stream.chunk_size;
    let tex_repeat = settings.terrain.tex_repeat;
    let seg = segments as i32;
    let side = segments + 1;
    let step = size / segments as f32;

    let wx = |i: i32| lattice_coord(cx, i, size, seg);
    let wz = |i: i32| lattice_coord(cz, i, size, seg);

    let mut min_height = f32::INFINITY;
    let mut max_height = f32::NEG_INFINITY;
    for iz in 0..side {
        for ix in 0..side {
            let h = terrain.terrain_height(wx(ix as i32), wz(iz as i32));
            mesh.heights[iz * side + ix] = h;
            min_height = min_height.min(h);
            max_height = max_height.max(h);
        }
    }
    mesh.min_height = min_height;
    mesh.max_height = max_height;

    // Neighbour height: cached inside the lattice, re-evaluated past the edge
    let height = |heights: &[f32], ix: i32, iz: i32| -> f32 {
        if (0..=seg).contains(&ix) && (0..=seg).contains(&iz) {
            heights[iz as usize * side + ix as usize]
        } else {
            terrain.terrain_height(wx(ix), wz(iz))
        }
    };

    for iz in 0..side {
        for ix in 0..side {
            let (i, j) = (ix as i32, iz as i32);
            let h = mesh.heights[iz * side + ix];
            let hl = height(&mesh.heights[..], i - 1, j);
            let hr = height(&mesh.heights[..], i + 1, j);
            let hd = height(&mesh.heights[..], i, j - 1);
            let hu = height(&mesh.heights[..], i, j + 1);
            let normal = glam::Vec3::new(hl - hr, 2.0 * step, hd - hu).normalize();

            let (x, z) = (wx(i), wz(j));
            mesh.vertices[iz * side + ix] = TerrainVertex {
                position: [size * ix as f32 / segments as f32, h, size * iz as f32 / segments as f32],
                normal: normal.to_array(),
                uv: [x / size * tex_repeat, z / size * tex_repeat],
                tree_density: terrain.tree_cover(x, z, h),
                dirt: terrain.dirt_amount(x, z),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::settings::WorldSettings;

    fn test_terrain() -> Terrain {
        let mut settings = WorldSettings::with_seed(42);
        settings.stream.segments = 8;
        Terrain::new(settings)
    }

    #[test]
    fn test_lattice_folds_into_neighbours() {
        assert_eq!(lattice_coord(0, 8, 32.0, 8), lattice_coord(1, 0, 32.0, 8));
        assert_eq!(lattice_coord(1, -1, 32.0, 8), lattice_coord(0, 7, 32.0, 8));
        assert_eq!(lattice_coord(-1, 9, 32.0, 8), lattice_coord(0, 1, 32.0, 8));
        assert_eq!(lattice_coord(2, 0, 32.0, 8), 64.0);
    }

    #[test]
    fn test_chunk_coord_floors_negatives() {
        assert_eq!(chunk_coord(-0.5, 32.0), -1);
        assert_eq!(chunk_coord(31.9, 32.0), 0);
        assert_eq!(chunk_coord(32.0, 32.0), 1);
    }

    #[test]
    fn test_grid_indices_alternate_diagonal() {
        let indices = grid_indices(2);
        assert_eq!(indices.len(), 2 * 2 * 6);
        assert_eq!(&indices[0..6], &[0, 3, 1, 1, 3, 4]);
        assert_eq!(&indices[6..12], &[1, 4, 5, 1, 5, 2]);
        assert!(indices.iter().all(|&i| i < 9));
    }

    #[test]
    fn test_seams_match_along_x() {
        let terrain = test_terrain();
        let mut a = Chunk::new();
        let mut b = Chunk::new();
        a.build(&terrain, 0, 0);
        b.build(&terrain, 1, 0);
        let (ma, mb) = (a.mesh().unwrap(), b.mesh().unwrap());
        let last = ma.vertices_per_side - 1;
        for iz in 0..ma.vertices_per_side {
            assert_eq!(ma.height_at(last, iz), mb.height_at(0, iz));
            assert_eq!(ma.vertex_at(last, iz).normal, mb.vertex_at(0, iz).normal);
        }
    }

    #[test]
    fn test_seams_match_along_z() {
        let terrain = test_terrain();
        let mut a = Chunk::new();
        let mut b = Chunk::new();
        a.build(&terrain, -3, -1);
        b.build(&terrain, -3, 0);
        let (ma, mb) = (a.mesh().unwrap(), b.mesh().unwrap());
        let last = ma.vertices_per_side - 1;
        for ix in 0..ma.vertices_per_side {
            assert_eq!(ma.height_at(ix, last), mb.height_at(ix, 0));
            assert_eq!(ma.vertex_at(ix, last).normal, mb.vertex_at(ix, 0).normal);
        }
    }

    #[test]
    fn test_rebuild_after_recycle_is_identical() {
        let terrain = test_terrain();
        let mut chunk = Chunk::new();
        chunk.build(&terrain, 3, -2);
        let vertices = chunk.mesh().unwrap().vertices.clone();
        let decorations = chunk.decorations.clone();

        chunk.deactivate();
        chunk.build(&terrain, 10, 10);
        chunk.deactivate();
        chunk.build(&terrain, 3, -2);

        assert_eq!(chunk.mesh().unwrap().vertices, vertices);
        assert_eq!(chunk.decorations, decorations);
    }

    #[test]
    fn test_deactivate_keeps_buffers() {
        let terrain = test_terrain();
        let mut chunk = Chunk::new();
        chunk.build(&terrain, 0, 0);
        assert!(chunk.is_active());

        chunk.deactivate();
        assert!(!chunk.is_active());
        assert!(chunk.decorations.is_empty());
        let mesh = chunk.mesh().unwrap();
        assert!(!mesh.visible);
        assert_eq!(mesh.vertices.len(), 81);

        chunk.dispose();
        assert!(chunk.mesh().is_none());
    }

    #[test]
    fn test_mesh_attributes() {
        let terrain = test_terrain();
        let shore = terrain.settings().zones.shore_level;
        let mut chunk = Chunk::new();
        chunk.build(&terrain, 0, 0);
        let mesh = chunk.mesh().unwrap();

        assert_eq!(mesh.triangle_count(), 8 * 8 * 2);
        assert!(mesh.min_height <= mesh.max_height);
        for (v, &h) in mesh.vertices.iter().zip(&mesh.heights) {
            assert_eq!(v.position[1], h);
            assert!((0.0..=1.0).contains(&v.tree_density));
            assert!((0.0..=1.0).contains(&v.dirt));
            assert!(v.normal[1] > 0.0);
            if h < shore {
                assert_eq!(v.tree_density, 0.0);
            }
        }
        // Spawn sits in a stream channel
        assert!(mesh.min_height < 0.0);
    }
}
