//! Finite heightmap snapshot around a moving centre
//!
//! For callers that need many nearby heights at once (minimap, water depth
//! bake). The height function itself stays uncached; the snapshot owns its
//! grid and only resamples once the centre drifts past `refresh_distance`.

use glam::Vec2;
use tracing::debug;

use crate::world::terrain::Terrain;

/// Slack, in grid cells, for points that land on the border after rounding
const EDGE_TOLERANCE: f32 = 1e-3;

#[derive(Clone, Debug)]
pub struct HeightmapSnapshot {
    resolution: usize,
    extent: f32,
    refresh_distance: f32,
    center: Vec2,
    heights: Vec<f32>,
    valid: bool,
}

impl HeightmapSnapshot {
    /// `resolution` samples per side spanning `extent` metres.
    pub fn new(resolution: usize, extent: f32, refresh_distance: f32) -> Self {
        let resolution = resolution.max(2);
        Self {
            resolution,
            extent,
            refresh_distance,
            center: Vec2::ZERO,
            heights: vec![0.0; resolution * resolution],
            valid: false,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    fn step(&self) -> f32 {
        self.extent / (self.resolution - 1) as f32
    }

    fn origin(&self) -> Vec2 {
        self.center - Vec2::splat(self.extent * 0.5)
    }

    /// World position of grid sample `(i, j)`.
    pub fn sample_position(&self, i: usize, j: usize) -> Vec2 {
        self.origin() + Vec2::new(i as f32, j as f32) * self.step()
    }

    /// Resamples around `(x, z)` if the snapshot is empty or stale.
    /// Returns whether the grid was rebuilt.
    pub fn refresh(&mut self, terrain: &Terrain, x: f32, z: f32) -> bool {
        let target = Vec2::new(x, z);
        if self.valid && self.center.distance(target) < self.refresh_distance {
            return false;
        }

        self.center = target;
        for j in 0..self.resolution {
            for i in 0..self.resolution {
                let p = self.sample_position(i, j);
                self.heights[j * self.resolution + i] = terrain.terrain_height(p.x, p.y);
            }
        }
        self.valid = true;
        debug!("Heightmap snapshot resampled around ({:.1}, {:.1})", x, z);
        true
    }

    pub fn contains(&self, x: f32, z: f32) -> bool {
        let local = (Vec2::new(x, z) - self.origin()) / self.step();
        let max = (self.resolution - 1) as f32 + EDGE_TOLERANCE;
        self.valid
            && local.x >= -EDGE_TOLERANCE
            && local.y >= -EDGE_TOLERANCE
            && local.x <= max
            && local.y <= max
    }

    /// Bilinear height at `(x, z)`, `None` outside the snapshot.
    pub fn sample(&self, x: f32, z: f32) -> Option<f32> {
        if !self.contains(x, z) {
            return None;
        }
        let last = self.resolution - 1;
        let local = ((Vec2::new(x, z) - self.origin()) / self.step()).clamp(Vec2::ZERO, Vec2::splat(last as f32));
        let i = (local.x.floor() as usize).min(last - 1);
        let j = (local.y.floor() as usize).min(last - 1);
        let fx = local.x - i as f32;
        let fz = local.y - j as f32;

        let at = |i: usize, j: usize| self.heights[j * self.resolution + i];
        let h0 = at(i, j) + (at(i + 1, j) - at(i, j)) * fx;
        let h1 = at(i, j + 1) + (at(i + 1, j + 1) - at(i, j + 1)) * fx;
        Some(h0 + (h1 - h0) * fz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_match_terrain_on_grid() {
        let terrain = Terrain::with_seed(42);
        let mut snapshot = HeightmapSnapshot::new(17, 64.0, 8.0);
        assert!(snapshot.refresh(&terrain, 100.0, -40.0));

        for (i, j) in [(0, 0), (3, 7), (16, 16), (8, 2)] {
            let p = snapshot.sample_position(i, j);
            let expected = terrain.terrain_height(p.x, p.y);
            let sampled = snapshot.sample(p.x, p.y).unwrap();
            assert!((sampled - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_interpolation_stays_between_neighbours() {
        let terrain = Terrain::with_seed(7);
        let mut snapshot = HeightmapSnapshot::new(9, 32.0, 4.0);
        snapshot.refresh(&terrain, 0.0, 0.0);

        let a = snapshot.sample_position(2, 2);
        let b = snapshot.sample_position(3, 2);
        let mid = snapshot.sample((a.x + b.x) * 0.5, a.y).unwrap();
        let (ha, hb) = (snapshot.sample(a.x, a.y).unwrap(), snapshot.sample(b.x, b.y).unwrap());
        assert!(mid >= ha.min(hb) - 1e-4 && mid <= ha.max(hb) + 1e-4);
    }

    #[test]
    fn test_outside_extent_is_none() {
        let terrain = Terrain::with_seed(42);
        let mut snapshot = HeightmapSnapshot::new(9, 32.0, 4.0);
        assert_eq!(snapshot.sample(0.0, 0.0), None);
        snapshot.refresh(&terrain, 0.0, 0.0);
        assert!(snapshot.sample(0.0, 0.0).is_some());
        assert_eq!(snapshot.sample(40.0, 0.0), None);
    }

    #[test]
    fn test_refresh_only_past_threshold() {
        let terrain = Terrain::with_seed(42);
        let mut snapshot = HeightmapSnapshot::new(9, 32.0, 4.0);
        assert!(snapshot.refresh(&terrain, 0.0, 0.0));
        assert!(!snapshot.refresh(&terrain, 2.0, 2.0));
        assert_eq!(snapshot.center(), Vec2::ZERO);
        assert!(snapshot.refresh(&terrain, 5.0, 0.0));
        assert_eq!(snapshot.center(), Vec2::new(5.0, 0.0));
    }
}
