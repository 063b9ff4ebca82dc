//! Height and density functions
//!
//! Everything here is a pure function of world (x, z) and the settings the
//! generator was built with. There is no backing grid: any coordinate can be
//! queried in any order and always yields the same value.

use glam::{Vec2, Vec3};
use tracing::warn;

use crate::core::noise::{NoiseBank, NoiseField};
use crate::utils::settings::WorldSettings;

const JITTER_SCALE: f32 = 0.7;
const JITTER_OFFSET: f32 = 100.0;
const FLOWER_FIELD_OFFSET: f32 = 200.0;
const FOOTHILL_BAND: f32 = 0.3;
const VALLEY_BAND: f32 = 0.35;
const VALLEY_EDGE: f32 = 0.05;
const TREE_COVER_SCALE: f32 = 0.5;

/// Named altitude bands, lowest first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AltitudeZone {
    Forest,
    Subalpine,
    Tussock,
    Alpine,
    Snow,
}

/// Individual terms of the height composition at one point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeightComponents {
    /// Fractal base in [-1, 1] before scaling
    pub base_normalized: f32,
    /// Base height with stream channels carved out
    pub stream_height: f32,
    /// Thresholded ridge mask times amplitude modulation times mountain height
    pub mountain: f32,
    pub foothill: f32,
    pub valley: f32,
    /// 0 inside the flat spawn disc, 1 beyond the fade radius
    pub spawn_fade: f32,
}

impl HeightComponents {
    pub fn mountain_contribution(&self) -> f32 {
        (self.mountain + self.foothill - self.valley) * self.spawn_fade
    }

    pub fn height(&self) -> f32 {
        self.stream_height + self.mountain_contribution()
    }
}

/// The terrain generator: seeded noise fields plus the settings that shape them.
///
/// Built once at startup and shared read-only (usually behind an `Arc`) by the
/// chunk streamer, movement, minimap baking and anything else that needs
/// ground height.
#[derive(Debug, Clone)]
pub struct Terrain {
    settings: WorldSettings,
    noise: NoiseBank,
}

impl Terrain {
    /// Builds the noise bank for `settings`. Invalid settings are accepted
    /// with a warning; placement skips categories whose grid cannot be walked.
    pub fn new(settings: WorldSettings) -> Self {
        if let Err(err) = settings.validate() {
            warn!("Building terrain from invalid settings: {}", err);
        }
        let noise = NoiseBank::new(settings.terrain.seed);
        Terrain { settings, noise }
    }

    pub fn with_seed(seed: u32) -> Self {
        Self::new(WorldSettings::with_seed(seed))
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn noise(&self) -> &NoiseBank {
        &self.noise
    }

    pub fn seed(&self) -> u32 {
        self.noise.seed()
    }

    /// Ground height in meters. Unclamped: peaks may exceed nominal ranges.
    pub fn terrain_height(&self, x: f32, z: f32) -> f32 {
        self.height_components(x, z).height()
    }

    pub fn height_components(&self, x: f32, z: f32) -> HeightComponents {
        let t = &self.settings.terrain;
        let base_normalized =
            self.noise
                .terrain
                .fractal(x, z, t.scale, t.octaves, t.persistence, t.lacunarity);
        let base = base_normalized * t.height;

        // Stream channels: warped ridge noise, carved less on high ground
        let s = &self.settings.streams;
        let (swx, swz) = warp(&self.noise.stream_warp, x, z, s.warp_scale, s.warp);
        let stream_raw = self.noise.stream.sample(swx * s.scale, swz * s.scale);
        let channel = (1.0 - stream_raw.abs()).powf(s.sharpness);
        let carve_mask = (1.0 - (base_normalized * 0.5 + 0.5) * s.carve_falloff).max(0.0);
        let stream_height = base - channel * s.depth * carve_mask;

        // Mountain chains: parabolic ridge so peaks are rounded, not knife-edged
        let m = &self.settings.mountains;
        let (mwx, mwz) = warp(&self.noise.mountain_warp, x, z, m.warp_scale, m.warp);
        let mountain_raw = self.noise.mountain.sample(mwx * m.scale, mwz * m.scale);
        let ridge = (1.0 - mountain_raw * mountain_raw).max(0.0).powf(m.sharpness);
        let detail = self
            .noise
            .mountain_detail
            .sample(x * m.detail_scale, z * m.detail_scale);
        let blended = ridge * (1.0 + detail * m.detail_amount);
        let mask = (blended - m.threshold).max(0.0) / (1.0 - m.threshold);
        let amplitude = 0.8
            + 0.2
                * self
                    .noise
                    .mountain_detail
                    .sample(z * m.amplitude_scale, x * m.amplitude_scale);
        let mountain = mask * amplitude * m.height;

        // Rolling foothills ramp in as the ridge value approaches the threshold
        let foothill_proximity = smoothstep(m.threshold - FOOTHILL_BAND, m.threshold, blended);
        let hills = self
            .noise
            .terrain
            .sample(z * m.foothill_scale, x * m.foothill_scale)
            * 0.5
            + 0.5;
        let foothill = hills * m.foothill_height * foothill_proximity;

        // Basins beside the ridges but off their crest hold alpine lakes
        let near_ridge = smoothstep(
            m.threshold - VALLEY_BAND,
            m.threshold - VALLEY_EDGE,
            blended,
        );
        let off_crest = (1.0 - mask * 4.0).clamp(0.0, 1.0);
        let valley = near_ridge * off_crest * (detail * 0.5 + 0.5) * m.valley_depth;

        HeightComponents {
            base_normalized,
            stream_height,
            mountain,
            foothill,
            valley,
            spawn_fade: self.spawn_fade(x, z),
        }
    }

    /// Mountain, foothill and valley terms after the spawn fade.
    pub fn mountain_contribution(&self, x: f32, z: f32) -> f32 {
        self.height_components(x, z).mountain_contribution()
    }

    /// Exactly 0 within the flat spawn radius, smoothly 1 by the fade radius.
    pub fn spawn_fade(&self, x: f32, z: f32) -> f32 {
        let m = &self.settings.mountains;
        let dist = (x * x + z * z).sqrt();
        if dist <= m.spawn_flat_radius {
            return 0.0;
        }
        let t = ((dist - m.spawn_flat_radius) / (m.spawn_fade_radius - m.spawn_flat_radius)).min(1.0);
        t * t * (3.0 - 2.0 * t)
    }

    /// Central-difference gradient of the height field.
    pub fn terrain_gradient(&self, x: f32, z: f32) -> Vec2 {
        let e = self.settings.zones.slope_epsilon;
        let dx = self.terrain_height(x + e, z) - self.terrain_height(x - e, z);
        let dz = self.terrain_height(x, z + e) - self.terrain_height(x, z - e);
        Vec2::new(dx, dz) / (2.0 * e)
    }

    /// Gradient magnitude (rise over run).
    pub fn terrain_slope(&self, x: f32, z: f32) -> f32 {
        self.terrain_gradient(x, z).length()
    }

    pub fn terrain_normal(&self, x: f32, z: f32) -> Vec3 {
        let g = self.terrain_gradient(x, z);
        Vec3::new(-g.x, 1.0, -g.y).normalize()
    }

    pub fn tree_density(&self, x: f32, z: f32) -> f32 {
        let scale = self.settings.trees.placement.density_scale;
        self.noise.tree.sample(x * scale, z * scale)
    }

    pub fn veg_density(&self, x: f32, z: f32) -> f32 {
        let scale = self.settings.vegetation.placement.density_scale;
        self.noise.vegetation.sample(x * scale, z * scale)
    }

    /// Flowers read the vegetation field at an offset so blooms do not
    /// coincide with the densest grass.
    pub fn flower_density(&self, x: f32, z: f32) -> f32 {
        let scale = self.settings.flowers.placement.density_scale;
        self.noise.vegetation.sample(
            (x + FLOWER_FIELD_OFFSET) * scale,
            (z + FLOWER_FIELD_OFFSET) * scale,
        )
    }

    pub fn rock_density(&self, x: f32, z: f32) -> f32 {
        let scale = self.settings.rocks.placement.density_scale;
        self.noise.rock.sample(x * scale, z * scale)
    }

    pub fn collectible_density(&self, x: f32, z: f32) -> f32 {
        let scale = self.settings.collectibles.placement.density_scale;
        self.noise.collectible.sample(x * scale, z * scale)
    }

    pub fn log_density(&self, x: f32, z: f32) -> f32 {
        let scale = self.settings.logs.placement.density_scale;
        self.noise.log.sample(x * scale, z * scale)
    }

    pub fn cottage_density(&self, x: f32, z: f32) -> f32 {
        let scale = self.settings.cottages.placement.density_scale;
        self.noise.cottage.sample(x * scale, z * scale)
    }

    /// Unit jitter offset in [-1, 1] per axis; callers scale by category.
    pub fn jitter(&self, x: f32, z: f32) -> Vec2 {
        Vec2::new(
            self.noise.jitter.sample(x * JITTER_SCALE, z * JITTER_SCALE),
            self.noise.jitter.sample(
                x * JITTER_SCALE + JITTER_OFFSET,
                z * JITTER_SCALE + JITTER_OFFSET,
            ),
        )
    }

    /// Dirt patch amount in [0, 1], higher means more bare soil.
    pub fn dirt_amount(&self, x: f32, z: f32) -> f32 {
        let scale = self.settings.terrain.dirt_scale;
        let n1 = self.noise.dirt.sample(x * scale, z * scale);
        let n2 = self.noise.dirt.sample(x * scale * 3.1, z * scale * 3.1) * 0.3;
        ((n1 + n2) * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    /// Smooth canopy coverage used to darken the ground under forest.
    pub fn tree_cover(&self, x: f32, z: f32, height: f32) -> f32 {
        if height < self.settings.zones.shore_level {
            return 0.0;
        }
        let p = &self.settings.trees.placement;
        let scale = p.density_scale * TREE_COVER_SCALE;
        let density = self.noise.tree.sample(x * scale, z * scale);
        smoothstep(p.density_threshold - 0.3, p.density_threshold + 0.3, density)
    }

    pub fn altitude_zone(&self, y: f32) -> AltitudeZone {
        let zones = &self.settings.zones;
        if y >= zones.snowline_start {
            AltitudeZone::Snow
        } else if y >= zones.alpine_start {
            AltitudeZone::Alpine
        } else if y >= zones.treeline_start {
            AltitudeZone::Tussock
        } else if y >= zones.subalpine_start {
            AltitudeZone::Subalpine
        } else {
            AltitudeZone::Forest
        }
    }

    /// Snow settles above the snowline except on faces too steep to hold it.
    pub fn is_snow(&self, x: f32, z: f32) -> bool {
        let zones = &self.settings.zones;
        self.terrain_height(x, z) >= zones.snowline_start
            && self.terrain_slope(x, z) <= zones.snow_max_slope
    }

    /// Tree scale multiplier: 1 below the subalpine band, shrinking to the
    /// treeline minimum, 0 at and above the treeline.
    pub fn tree_scale_factor(&self, y: f32) -> f32 {
        let zones = &self.settings.zones;
        if y >= zones.treeline_start {
            return 0.0;
        }
        if y <= zones.subalpine_start {
            return 1.0;
        }
        let t = (y - zones.subalpine_start) / (zones.treeline_start - zones.subalpine_start);
        1.0 + (zones.treeline_scale_min - 1.0) * t
    }

    pub fn is_above_shore(&self, y: f32) -> bool {
        y >= self.settings.zones.shore_level
    }

    pub fn is_underwater(&self, y: f32) -> bool {
        y <= self.settings.zones.water_level
    }
}

/// Domain warp: offsets both axes by the warp field, the z axis reading it
/// with swapped coordinates so the two offsets decorrelate.
fn warp(field: &NoiseField, x: f32, z: f32, scale: f32, magnitude: f32) -> (f32, f32) {
    (
        x + field.sample(x * scale, z * scale) * magnitude,
        z + field.sample(z * scale, x * scale) * magnitude,
    )
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn sample_points() -> impl Iterator<Item = (f32, f32)> {
        (0..400).map(|i| {
            let a = i as f32 * 0.731;
            let r = 5.0 + i as f32 * 3.9;
            (a.cos() * r, a.sin() * r)
        })
    }

    #[test]
    fn test_height_is_deterministic_across_instances() {
        let a = Terrain::with_seed(42);
        let b = Terrain::with_seed(42);
        for (x, z) in sample_points() {
            assert_eq!(a.terrain_height(x, z).to_bits(), b.terrain_height(x, z).to_bits());
            assert_eq!(a.terrain_height(x, z).to_bits(), a.terrain_height(x, z).to_bits());
        }
    }

    #[test]
    fn test_origin_reference_height() {
        // Every field is zero at the origin lattice point, so the origin sits
        // at the bottom of a full-depth stream channel with half carve falloff.
        let terrain = Terrain::with_seed(42);
        let expected = -STREAM_DEPTH * (1.0 - 0.5 * STREAM_CARVE_FALLOFF);
        let h = terrain.terrain_height(0.0, 0.0);
        assert!((h - expected).abs() < 1e-4, "height at origin was {h}");
    }

    #[test]
    fn test_spawn_area_has_no_mountains() {
        let terrain = Terrain::with_seed(42);
        for i in 0..600 {
            let a = i as f32 * 0.37;
            let r = (i % 60) as f32 * 0.99;
            let (x, z) = (a.cos() * r, a.sin() * r);
            let parts = terrain.height_components(x, z);
            assert_eq!(parts.mountain_contribution(), 0.0);
            assert_eq!(terrain.terrain_height(x, z), parts.stream_height);
        }
    }

    #[test]
    fn test_spawn_fade_ramp() {
        let terrain = Terrain::with_seed(1);
        assert_eq!(terrain.spawn_fade(0.0, 59.9), 0.0);
        assert_eq!(terrain.spawn_fade(100.0, 0.0), 1.0);
        assert_eq!(terrain.spawn_fade(500.0, -300.0), 1.0);
        let mid = terrain.spawn_fade(80.0, 0.0);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_height_is_smooth() {
        let terrain = Terrain::with_seed(42);
        let eps = 0.01;
        for (x, z) in sample_points() {
            let h0 = terrain.terrain_height(x, z);
            let hx = terrain.terrain_height(x + eps, z);
            let hz = terrain.terrain_height(x, z + eps);
            assert!((hx - h0).abs() < 50.0 * eps, "jump at ({x}, {z}): {h0} -> {hx}");
            assert!((hz - h0).abs() < 50.0 * eps, "jump at ({x}, {z}): {h0} -> {hz}");
        }
    }

    #[test]
    fn test_densities_in_range() {
        let terrain = Terrain::with_seed(5);
        for (x, z) in sample_points() {
            for d in [
                terrain.tree_density(x, z),
                terrain.veg_density(x, z),
                terrain.flower_density(x, z),
                terrain.rock_density(x, z),
                terrain.collectible_density(x, z),
                terrain.log_density(x, z),
                terrain.cottage_density(x, z),
            ] {
                assert!((-1.0..=1.0).contains(&d));
            }
            assert!((0.0..=1.0).contains(&terrain.dirt_amount(x, z)));
        }
    }

    #[test]
    fn test_slope_and_normal_agree() {
        let terrain = Terrain::with_seed(42);
        for (x, z) in sample_points().take(50) {
            let slope = terrain.terrain_slope(x, z);
            let normal = terrain.terrain_normal(x, z);
            assert!(slope >= 0.0);
            assert!(normal.y > 0.0);
            assert!((normal.length() - 1.0).abs() < 1e-4);
            let expected_y = 1.0 / (1.0 + slope * slope).sqrt();
            assert!((normal.y - expected_y).abs() < 1e-3);
        }
    }

    #[test]
    fn test_altitude_zones() {
        let terrain = Terrain::with_seed(42);
        assert_eq!(terrain.altitude_zone(0.0), AltitudeZone::Forest);
        assert_eq!(terrain.altitude_zone(SUBALPINE_START), AltitudeZone::Subalpine);
        assert_eq!(terrain.altitude_zone(TREELINE_START + 1.0), AltitudeZone::Tussock);
        assert_eq!(terrain.altitude_zone(ALPINE_START + 0.5), AltitudeZone::Alpine);
        assert_eq!(terrain.altitude_zone(80.0), AltitudeZone::Snow);
    }

    #[test]
    fn test_tree_scale_factor_shrinks_toward_treeline() {
        let terrain = Terrain::with_seed(42);
        assert_eq!(terrain.tree_scale_factor(0.0), 1.0);
        assert_eq!(terrain.tree_scale_factor(TREELINE_START), 0.0);
        let mid = terrain.tree_scale_factor((SUBALPINE_START + TREELINE_START) * 0.5);
        assert!(mid < 1.0 && mid > TREELINE_SCALE_MIN);
    }

    #[test]
    fn test_tree_cover_zero_below_shore() {
        let terrain = Terrain::with_seed(42);
        assert_eq!(terrain.tree_cover(10.0, 10.0, SHORE_LEVEL - 0.1), 0.0);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = Terrain::with_seed(42);
        let b = Terrain::with_seed(43);
        let differs = sample_points().any(|(x, z)| a.terrain_height(x, z) != b.terrain_height(x, z));
        assert!(differs);
    }
}
