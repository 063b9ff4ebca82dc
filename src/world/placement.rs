//! Deterministic decoration placement
//!
//! Each category walks its own regular sub-grid across a chunk, jitters the
//! candidate off-grid, and keeps it when the density field and the
//! category's exclusion rules allow. Attributes come from position only, so
//! a rebuilt chunk always reproduces the same lists.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::core::hash::{
    cluster_count, flower_color_index, object_seed, rotation_seed, sin_hash, tree_type,
};
use crate::utils::settings::PlacementSettings;
use crate::world::foam::FoamSegment;
use crate::world::terrain::Terrain;

// Jitter field offsets keep categories from sharing offsets
const VEG_JITTER_OFFSET: f32 = 50.0;
const FLOWER_JITTER_OFFSET: f32 = 150.0;
const ROCK_JITTER_OFFSET: f32 = 300.0;
const COTTAGE_JITTER_OFFSET: f32 = 400.0;
const COLLECTIBLE_JITTER_OFFSET: f32 = 500.0;
const LOG_JITTER_OFFSET: f32 = 700.0;

const MAX_VEG_TUFTS: u32 = 3;
const MAX_GARDEN_CLUSTER: u32 = 2;
const GARDEN_CLUSTER_SPREAD: f32 = 0.3;
const ROCK_MEDIUM_DENSITY: f32 = 0.6;
const ROCK_BOULDER_DENSITY: f32 = 0.75;
const STUMP_CHANCE: f64 = 0.35;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreePlacement {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub tree_type: u32,
    pub scale: f32,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum VegetationKind {
    Grass,
    Fern,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VegetationPlacement {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub kind: VegetationKind,
    pub scale: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowerPlacement {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color_index: u32,
    pub scale: f32,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RockSize {
    Small,
    Medium,
    Boulder,
}

impl RockSize {
    pub fn index(self) -> usize {
        match self {
            RockSize::Small => 0,
            RockSize::Medium => 1,
            RockSize::Boulder => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RockPlacement {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub size: RockSize,
    pub rotation_seed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollectiblePlacement {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum LogKind {
    Fallen,
    Stump,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogPlacement {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub kind: LogKind,
    /// Length for fallen logs, height multiplier for stumps
    pub scale: f32,
    pub rotation_seed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CottagePlacement {
    pub x: f32,
    /// Lowest ground height under the footprint
    pub y: f32,
    pub z: f32,
    pub seed: u32,
}

/// Everything a chunk scatters on its tile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkDecorations {
    pub trees: Vec<TreePlacement>,
    pub vegetation: Vec<VegetationPlacement>,
    pub flowers: Vec<FlowerPlacement>,
    pub rocks: Vec<RockPlacement>,
    pub collectibles: Vec<CollectiblePlacement>,
    pub logs: Vec<LogPlacement>,
    pub cottages: Vec<CottagePlacement>,
    pub foam: Vec<FoamSegment>,
}

impl ChunkDecorations {
    pub fn clear(&mut self) {
        self.trees.clear();
        self.vegetation.clear();
        self.flowers.clear();
        self.rocks.clear();
        self.collectibles.clear();
        self.logs.clear();
        self.cottages.clear();
        self.foam.clear();
    }

    pub fn total(&self) -> usize {
        self.trees.len()
            + self.vegetation.len()
            + self.flowers.len()
            + self.rocks.len()
            + self.collectibles.len()
            + self.logs.len()
            + self.cottages.len()
            + self.foam.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Local offsets of a category's sub-grid: `offset, offset + spacing, ...`
/// strictly below `size`.
pub fn grid_points(size: f32, spacing: f32, offset_fraction: f32) -> impl Iterator<Item = f32> {
    let offset = spacing * offset_fraction;
    // A non-positive step would never reach `size`
    let steps = spacing > 0.0;
    (0u32..)
        .map(move |i| offset + i as f32 * spacing)
        .take_while(move |&v| steps && v < size)
}

/// Placement pass over one chunk rectangle.
pub struct Scatter<'a> {
    terrain: &'a Terrain,
    origin_x: f32,
    origin_z: f32,
    size: f32,
    /// Cottages whose clearing can reach into this chunk, wherever they live
    nearby_cottages: Vec<CottagePlacement>,
}

impl<'a> Scatter<'a> {
    pub fn new(terrain: &'a Terrain, cx: i32, cz: i32) -> Self {
        let size = terrain.settings().stream.chunk_size;
        let origin_x = cx as f32 * size;
        let origin_z = cz as f32 * size;
        // Candidates are tested after jitter, so look past the chunk edge
        let s = terrain.settings();
        let max_jitter = s
            .trees
            .placement
            .jitter
            .max(s.vegetation.placement.jitter + s.vegetation.cluster_radius)
            .max(s.flowers.placement.jitter)
            .max(s.logs.placement.jitter)
            .abs();
        let reach = s.cottages.clearing_radius + max_jitter;
        let nearby_cottages = cottages_in_rect(
            terrain,
            origin_x - reach,
            origin_z - reach,
            origin_x + size + reach,
            origin_z + size + reach,
        );
        Scatter {
            terrain,
            origin_x,
            origin_z,
            size,
            nearby_cottages,
        }
    }

    /// Runs every category into `out`, which is cleared first.
    pub fn populate(&self, out: &mut ChunkDecorations) {
        out.clear();
        self.cottages(&mut out.cottages);
        self.trees(&mut out.trees);
        self.vegetation(&mut out.vegetation);
        self.flowers(&mut out.flowers);
        self.garden_flowers(&out.cottages, &mut out.flowers);
        self.rocks(&mut out.rocks);
        self.collectibles(&mut out.collectibles);
        self.logs(&mut out.logs);
    }

    pub fn in_clearing(&self, x: f32, z: f32) -> bool {
        let r = self.terrain.settings().cottages.clearing_radius;
        let r2 = r * r;
        self.nearby_cottages.iter().any(|c| {
            let dx = x - c.x;
            let dz = z - c.z;
            dx * dx + dz * dz < r2
        })
    }

    fn owns(&self, x: f32, z: f32) -> bool {
        x >= self.origin_x
            && x < self.origin_x + self.size
            && z >= self.origin_z
            && z < self.origin_z + self.size
    }

    fn for_each_candidate(&self, placement: &PlacementSettings, offset_fraction: f32, mut f: impl FnMut(f32, f32)) {
        for lz in grid_points(self.size, placement.grid_spacing, offset_fraction) {
            for lx in grid_points(self.size, placement.grid_spacing, offset_fraction) {
                f(self.origin_x + lx, self.origin_z + lz);
            }
        }
    }

    fn cottages(&self, out: &mut Vec<CottagePlacement>) {
        out.extend(
            self.nearby_cottages
                .iter()
                .filter(|c| self.owns(c.x, c.z))
                .copied(),
        );
    }

    fn trees(&self, out: &mut Vec<TreePlacement>) {
        let terrain = self.terrain;
        let s = &terrain.settings().trees;
        let threshold = s.placement.density_threshold;

        self.for_each_candidate(&s.placement, 0.5, |wx, wz| {
            let density = terrain.tree_density(wx, wz);
            if density <= threshold {
                return;
            }
            let jitter = terrain.jitter(wx, wz) * s.placement.jitter;
            let (jx, jz) = (wx + jitter.x, wz + jitter.y);
            let ground = terrain.terrain_height(jx, jz);
            if !terrain.is_above_shore(ground) {
                return;
            }
            let altitude_scale = terrain.tree_scale_factor(ground);
            if altitude_scale <= 0.0 || self.in_clearing(jx, jz) {
                return;
            }
            if terrain.terrain_slope(jx, jz) > s.max_slope {
                return;
            }

            let t = (density - threshold) / (1.0 - threshold);
            let scale = (s.min_height + t * (s.max_height - s.min_height)) * altitude_scale;
            out.push(TreePlacement {
                x: jx,
                y: ground - s.sink,
                z: jz,
                tree_type: tree_type(density, s.types),
                scale,
            });
        });
    }

    fn vegetation_allowed(&self, x: f32, z: f32, y: f32) -> bool {
        self.terrain.is_above_shore(y)
            && y < self.terrain.settings().zones.alpine_start
            && !self.in_clearing(x, z)
    }

    fn vegetation(&self, out: &mut Vec<VegetationPlacement>) {
        let terrain = self.terrain;
        let s = &terrain.settings().vegetation;

        self.for_each_candidate(&s.placement, 0.25, |wx, wz| {
            let density = terrain.veg_density(wx, wz);
            if density <= s.placement.density_threshold {
                return;
            }
            let jitter = terrain.jitter(wx + VEG_JITTER_OFFSET, wz + VEG_JITTER_OFFSET) * s.placement.jitter;
            let (jx, jz) = (wx + jitter.x, wz + jitter.y);
            let y = terrain.terrain_height(jx, jz);
            if !self.vegetation_allowed(jx, jz, y) {
                return;
            }

            let kind = if density > s.fern_threshold {
                VegetationKind::Fern
            } else {
                VegetationKind::Grass
            };
            let scale = 0.5 + density * 0.8;
            out.push(VegetationPlacement { x: jx, y, z: jz, kind, scale });

            // Tufts around the anchor
            for k in 0..cluster_count(jx, jz, MAX_VEG_TUFTS) {
                let k = (k + 1) as f32;
                let offset = terrain.jitter(jx + 31.0 * k, jz - 17.0 * k) * s.cluster_radius;
                let (tx, tz) = (jx + offset.x, jz + offset.y);
                let ty = terrain.terrain_height(tx, tz);
                if self.vegetation_allowed(tx, tz, ty) {
                    out.push(VegetationPlacement {
                        x: tx,
                        y: ty,
                        z: tz,
                        kind,
                        scale: scale * 0.8,
                    });
                }
            }
        });
    }

    fn flowers(&self, out: &mut Vec<FlowerPlacement>) {
        let terrain = self.terrain;
        let s = &terrain.settings().flowers;
        let treeline = terrain.settings().zones.treeline_start;

        self.for_each_candidate(&s.placement, 0.3, |wx, wz| {
            let density = terrain.flower_density(wx, wz);
            if density <= s.placement.density_threshold {
                return;
            }
            let jitter = terrain.jitter(wx + FLOWER_JITTER_OFFSET, wz + FLOWER_JITTER_OFFSET) * s.placement.jitter;
            let (jx, jz) = (wx + jitter.x, wz + jitter.y);
            let y = terrain.terrain_height(jx, jz);
            if !terrain.is_above_shore(y) || y >= treeline || self.in_clearing(jx, jz) {
                return;
            }
            out.push(FlowerPlacement {
                x: jx,
                y,
                z: jz,
                color_index: flower_color_index(jx, jz, s.colors),
                scale: s.scale + density * 0.3,
            });
        });
    }

    /// Flower beds ringing each cottage this chunk owns.
    fn garden_flowers(&self, cottages: &[CottagePlacement], out: &mut Vec<FlowerPlacement>) {
        let terrain = self.terrain;
        let s = &terrain.settings().flowers;
        let garden = &terrain.settings().cottages;
        if garden.garden_flowers == 0 {
            return;
        }

        for cottage in cottages {
            let phase = sin_hash(cottage.x, cottage.z, 4.7, 9.1) as f32 * TAU;
            for i in 0..garden.garden_flowers {
                let angle = phase + i as f32 / garden.garden_flowers as f32 * TAU;
                let radius = garden.garden_radius
                    * (0.8 + 0.4 * sin_hash(cottage.x + i as f32, cottage.z, 2.3, 5.9) as f32);
                let ax = cottage.x + angle.cos() * radius;
                let az = cottage.z + angle.sin() * radius;

                for k in 0..=cluster_count(ax, az, MAX_GARDEN_CLUSTER) {
                    let offset = if k == 0 {
                        Vec2::ZERO
                    } else {
                        terrain.jitter(ax + 13.0 * k as f32, az + 29.0 * k as f32) * GARDEN_CLUSTER_SPREAD
                    };
                    let (fx, fz) = (ax + offset.x, az + offset.y);
                    let y = terrain.terrain_height(fx, fz);
                    if !terrain.is_above_shore(y) {
                        continue;
                    }
                    out.push(FlowerPlacement {
                        x: fx,
                        y,
                        z: fz,
                        color_index: flower_color_index(fx, fz, s.colors),
                        scale: s.scale,
                    });
                }
            }
        }
    }

    fn rocks(&self, out: &mut Vec<RockPlacement>) {
        let terrain = self.terrain;
        let s = &terrain.settings().rocks;

        self.for_each_candidate(&s.placement, 0.4, |wx, wz| {
            let density = terrain.rock_density(wx, wz);
            if density <= s.placement.density_threshold {
                return;
            }
            let jitter = terrain.jitter(wx + ROCK_JITTER_OFFSET, wz + ROCK_JITTER_OFFSET) * s.placement.jitter;
            let (jx, jz) = (wx + jitter.x, wz + jitter.y);
            let y = terrain.terrain_height(jx, jz);
            if terrain.is_underwater(y) {
                return;
            }

            let size = if density > ROCK_BOULDER_DENSITY {
                RockSize::Boulder
            } else if density > ROCK_MEDIUM_DENSITY {
                RockSize::Medium
            } else {
                RockSize::Small
            };
            out.push(RockPlacement {
                x: jx,
                y,
                z: jz,
                size,
                rotation_seed: rotation_seed(jx, jz),
            });
        });
    }

    fn collectibles(&self, out: &mut Vec<CollectiblePlacement>) {
        let terrain = self.terrain;
        let s = &terrain.settings().collectibles;
        let alpine = terrain.settings().zones.alpine_start;

        self.for_each_candidate(&s.placement, 0.5, |wx, wz| {
            let jitter = terrain.jitter(wx + COLLECTIBLE_JITTER_OFFSET, wz + COLLECTIBLE_JITTER_OFFSET) * s.placement.jitter;
            let (jx, jz) = (wx + jitter.x, wz + jitter.y);
            if terrain.collectible_density(jx, jz) <= s.placement.density_threshold {
                return;
            }
            let y = terrain.terrain_height(jx, jz);
            if !terrain.is_above_shore(y) || y >= alpine {
                return;
            }
            out.push(CollectiblePlacement {
                x: jx,
                y: y + s.hover,
                z: jz,
            });
        });
    }

    fn logs(&self, out: &mut Vec<LogPlacement>) {
        let terrain = self.terrain;
        let s = &terrain.settings().logs;
        let threshold = s.placement.density_threshold;
        let treeline = terrain.settings().zones.treeline_start;

        self.for_each_candidate(&s.placement, 0.5, |wx, wz| {
            let jitter = terrain.jitter(wx + LOG_JITTER_OFFSET, wz + LOG_JITTER_OFFSET) * s.placement.jitter;
            let (jx, jz) = (wx + jitter.x, wz + jitter.y);
            let density = terrain.log_density(jx, jz);
            if density <= threshold {
                return;
            }
            let y = terrain.terrain_height(jx, jz);
            if !terrain.is_above_shore(y) || y >= treeline || self.in_clearing(jx, jz) {
                return;
            }

            let t = (density - threshold) / (1.0 - threshold);
            let (kind, scale) = if sin_hash(jx, jz, 3.1, 7.7) < STUMP_CHANCE {
                (LogKind::Stump, 0.5 + t * 0.5)
            } else {
                (LogKind::Fallen, s.min_length + t * (s.max_length - s.min_length))
            };
            out.push(LogPlacement {
                x: jx,
                y,
                z: jz,
                kind,
                scale,
                rotation_seed: rotation_seed(jx, jz),
            });
        });
    }
}

/// Cottages live on a world-aligned lattice so that every chunk, and every
/// rebuild of a chunk, agrees on where they are.
pub fn cottage_at_cell(terrain: &Terrain, i: i32, j: i32) -> Option<CottagePlacement> {
    let s = &terrain.settings().cottages;
    let zones = &terrain.settings().zones;
    let spacing = s.placement.grid_spacing;

    let bx = (i as f32 + 0.5) * spacing;
    let bz = (j as f32 + 0.5) * spacing;
    let jitter = terrain.jitter(bx + COTTAGE_JITTER_OFFSET, bz + COTTAGE_JITTER_OFFSET) * s.placement.jitter;
    let (x, z) = (bx + jitter.x, bz + jitter.y);

    if terrain.cottage_density(x, z) <= s.placement.density_threshold {
        return None;
    }
    if terrain.tree_density(x, z) < s.min_tree_density {
        return None;
    }

    let r = s.footprint_radius;
    let footprint = [(x, z), (x + r, z), (x - r, z), (x, z + r), (x, z - r)];
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for &(fx, fz) in &footprint {
        let h = terrain.terrain_height(fx, fz);
        min_y = min_y.min(h);
        max_y = max_y.max(h);
    }
    if !terrain.is_above_shore(min_y) || max_y >= zones.treeline_start {
        return None;
    }
    if max_y - min_y > s.max_height_range {
        return None;
    }
    if footprint
        .iter()
        .any(|&(fx, fz)| terrain.terrain_slope(fx, fz) > s.max_slope)
    {
        return None;
    }

    Some(CottagePlacement {
        x,
        y: min_y,
        z,
        seed: object_seed(x, z),
    })
}

/// All cottages whose jittered position falls inside the rectangle.
pub fn cottages_in_rect(
    terrain: &Terrain,
    min_x: f32,
    min_z: f32,
    max_x: f32,
    max_z: f32,
) -> Vec<CottagePlacement> {
    let s = &terrain.settings().cottages;
    let spacing = s.placement.grid_spacing;
    let slack = s.placement.jitter.abs();
    if !(spacing > 0.0) {
        return Vec::new();
    }

    let i0 = ((min_x - slack) / spacing).floor() as i32;
    let i1 = ((max_x + slack) / spacing).floor() as i32;
    let j0 = ((min_z - slack) / spacing).floor() as i32;
    let j1 = ((max_z + slack) / spacing).floor() as i32;

    let mut cottages = Vec::new();
    for j in j0..=j1 {
        for i in i0..=i1 {
            if let Some(c) = cottage_at_cell(terrain, i, j) {
                if c.x >= min_x && c.x < max_x && c.z >= min_z && c.z < max_z {
                    cottages.push(c);
                }
            }
        }
    }
    cottages
}
